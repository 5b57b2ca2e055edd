pub mod check;
pub mod info;
pub mod play;
pub mod record;
