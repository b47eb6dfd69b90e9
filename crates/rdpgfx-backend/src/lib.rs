#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[macro_use]
extern crate tracing;

#[macro_use]
mod macros;

pub mod bitmap;
pub mod codec;
pub mod config;
pub mod glyph;
pub mod native;
pub mod pointer;
pub mod registry;
pub mod software;
pub mod surface;

mod context;

use core::fmt;

pub use config::Config;
pub use context::GraphicsContext;

use crate::codec::CodecId;

pub type BackendResult<T> = Result<T, BackendError>;

#[non_exhaustive]
#[derive(Debug)]
pub enum BackendErrorKind {
    Allocation,
    Decode,
    UnsupportedCodec(CodecId),
    Reason(String),
    General,
    Custom,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            BackendErrorKind::Allocation => write!(f, "allocation failure"),
            BackendErrorKind::Decode => write!(f, "decode error"),
            BackendErrorKind::UnsupportedCodec(codec) => write!(f, "unsupported codec: {codec:?}"),
            BackendErrorKind::Reason(description) => write!(f, "reason: {description}"),
            BackendErrorKind::General => write!(f, "general error"),
            BackendErrorKind::Custom => write!(f, "custom error"),
        }
    }
}

impl core::error::Error for BackendErrorKind {}

pub type BackendError = ironrdp_error::Error<BackendErrorKind>;

pub trait BackendErrorExt {
    fn allocation<E>(context: &'static str, e: E) -> Self
    where
        E: core::error::Error + Sync + Send + 'static;
    fn decode<E>(context: &'static str, e: E) -> Self
    where
        E: core::error::Error + Sync + Send + 'static;
    fn unsupported_codec(context: &'static str, codec: CodecId) -> Self;
    fn general(context: &'static str) -> Self;
    fn reason(context: &'static str, reason: impl Into<String>) -> Self;
    fn custom<E>(context: &'static str, e: E) -> Self
    where
        E: core::error::Error + Sync + Send + 'static;
}

impl BackendErrorExt for BackendError {
    fn allocation<E>(context: &'static str, e: E) -> Self
    where
        E: core::error::Error + Sync + Send + 'static,
    {
        Self::new(context, BackendErrorKind::Allocation).with_source(e)
    }

    fn decode<E>(context: &'static str, e: E) -> Self
    where
        E: core::error::Error + Sync + Send + 'static,
    {
        Self::new(context, BackendErrorKind::Decode).with_source(e)
    }

    fn unsupported_codec(context: &'static str, codec: CodecId) -> Self {
        Self::new(context, BackendErrorKind::UnsupportedCodec(codec))
    }

    fn general(context: &'static str) -> Self {
        Self::new(context, BackendErrorKind::General)
    }

    fn reason(context: &'static str, reason: impl Into<String>) -> Self {
        Self::new(context, BackendErrorKind::Reason(reason.into()))
    }

    fn custom<E>(context: &'static str, e: E) -> Self
    where
        E: core::error::Error + Sync + Send + 'static,
    {
        Self::new(context, BackendErrorKind::Custom).with_source(e)
    }
}
