use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Current instant as a zone-less UTC timestamp, the form every entity stores.
pub fn primitive_now_utc() -> PrimitiveDateTime {
    to_primitive_utc(OffsetDateTime::now_utc())
}

pub fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}
