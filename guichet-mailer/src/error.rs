use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Email transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email builder error: {0}")]
    Builder(String),

    #[error("File transport error: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("Email message error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MailerError>;
