pub mod job_execution;
pub mod qr_code;
pub mod sequence;
pub mod virtual_card;
pub mod virtual_card_qr_code;

pub use job_execution::Entity as JobExecution;
pub use qr_code::Entity as QrCode;
pub use sequence::Entity as Sequence;
pub use virtual_card::Entity as VirtualCard;
pub use virtual_card_qr_code::Entity as VirtualCardQrCode;
