use thiserror::Error;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error {
    #[from]
    pub kind: ErrorKind,
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("Error serializing or deserializing json: {err}")]
    SerdeJson {
        #[from]
        err: serde_json::Error,
    },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Invalid weapon definition: {detail}")]
    InvalidWeapon { detail: String },
    #[error("Invalid bucket definition: {detail}")]
    InvalidBucket { detail: String },
    #[error("Weapon '{name}' is defined more than once")]
    DuplicateWeapon { name: String },
    #[error("Bucket '{name}' is defined more than once")]
    DuplicateBucket { name: String },
}

impl std::convert::From<std::io::Error> for Error {
    fn from(x: std::io::Error) -> Error {
        Error { kind: x.into() }
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(x: serde_json::Error) -> Error {
        Error { kind: x.into() }
    }
}

pub type IResult<T> = Result<T, Error>;

pub fn failure_from_kind(kind: ErrorKind) -> Error {
    Error { kind }
}
