pub mod labels;
pub mod originals;
pub mod session;
pub mod ws;
