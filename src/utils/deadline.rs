use chrono::{DateTime, Local, LocalResult, NaiveTime, Offset, TimeZone};

/// 签名 URL 的有效窗口（秒）
pub const SIGNED_URL_VALIDITY_SECS: i64 = 24 * 60 * 60;

/// 计算签名 URL 的截止时间（Unix 秒）
///
/// 截止时间为 `now` 所在自然日的零点（按 `now` 的时区）再加一天，
/// 即总是落在下一个零点，而不是 `now` 之后 24 小时。
/// 同一天内的所有请求得到相同的截止时间。
pub fn signed_url_deadline<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    midnight(now) + SIGNED_URL_VALIDITY_SECS
}

/// 按服务器本地时区计算当前的签名截止时间
pub fn current_deadline() -> i64 {
    signed_url_deadline(&Local::now())
}

/// `now` 所在自然日零点的 Unix 秒
fn midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let naive = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&naive) {
        LocalResult::Single(t) => t.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        // 零点因夏令时跳变不存在时，沿用当前偏移量
        LocalResult::None => {
            let offset = now.offset().fix().local_minus_utc() as i64;
            naive.and_utc().timestamp() - offset
        }
    }
}
