#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: f64 },

    #[error("invalid canvas size {width}x{height}: both dimensions must be finite and positive")]
    InvalidCanvas { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
