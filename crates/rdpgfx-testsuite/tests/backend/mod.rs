mod bitmap;
mod pointer;
mod registry;
