use failure::Fail;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "invalid input: {}", reason)]
    InvalidInput { reason: String },

    #[fail(
        display = "ciphertext of {} bytes is too short for two chunks of any key length in {}..={}",
        len, min_len, max_len
    )]
    InsufficientData {
        len: usize,
        min_len: usize,
        max_len: usize,
    },

    #[fail(display = "invalid hex string")]
    InvalidHex,

    #[fail(display = "invalid base64: {}", _0)]
    Base64(#[cause] base64::DecodeError),
}

impl Error {
    pub(crate) fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Base64(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
