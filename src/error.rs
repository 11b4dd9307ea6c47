use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not build the index")]
    Index,
    #[display("could not launch {}", _0)]
    Launch(#[error(not(source))] String),
    #[display("could not write output")]
    Output,
}
