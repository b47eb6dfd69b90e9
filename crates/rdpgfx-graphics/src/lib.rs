#![cfg_attr(doc, doc = include_str!("../README.md"))]
#![allow(clippy::cast_possible_truncation)] // channel values are masked before narrowing

pub mod color_conversion;
pub mod geometry;
pub mod glyph;
pub mod image_processing;
pub mod pointer;
