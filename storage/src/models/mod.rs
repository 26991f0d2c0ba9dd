mod message_record;
mod sender_info;

pub use message_record::MessageRecord;
pub use sender_info::SenderInfo;
