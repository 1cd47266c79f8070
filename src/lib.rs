//! snapup: capture a screen region, upload it, share the link
//!
//! This library drives the OS screenshot utility, downsizes retina
//! captures, uploads images to a Gyazo or Imgur compatible host, and hands the
//! resulting URLs to the clipboard and browser. Supplied files and remote
//! URLs can be uploaded instead of taking a new capture.

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod upload;
pub mod util;
