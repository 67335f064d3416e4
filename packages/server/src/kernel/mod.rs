//! Kernel-level infrastructure shared by the HTTP surface and the binary.

pub mod jobs;
