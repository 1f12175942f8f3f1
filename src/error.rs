use std::{convert::From, fmt};

/// Simple custom Error for the decode generator
pub struct Error {
    pub kind: ErrorKind,
    pub ctx: Option<String>,
    pub msg: String,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// input line does not match the invocation shape
    Syntax,
    /// bad character in a bit-pattern literal
    Pattern,
    /// trailing width literal is neither 32 nor 64
    Width,
    /// two patterns in one group share (mask, key)
    Conflict,
    /// underlying io error
    IO,
    /// catch-all for other errors
    General,
}

impl Error {
    pub fn new(kind: ErrorKind, ctx: Option<String>, message: &str) -> Error {
        Error {
            kind,
            ctx,
            msg: String::from(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, None, e.to_string().as_str()) }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}: {}", red!("decgen::Error"), self.msg) }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = write!(f, "{}", self.msg);
        if res.is_ok() {
            if let Some(ctx) = &self.ctx {
                res = write!(f, "\n --> {}", ctx);
            }
        }
        res
    }
}
impl std::error::Error for Error {}
