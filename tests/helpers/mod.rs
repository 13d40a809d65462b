pub mod app;
pub mod builders;
pub mod db;

pub use app::TestApp;
pub use builders::{CardBuilder, QrCodeBuilder};
pub use db::TestDb;
