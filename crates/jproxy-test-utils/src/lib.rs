//! Utilities shared by jproxy tests.
//!
//! [`ClassWriter`] encodes small but valid JVM classfiles so loader and planner tests can run
//! against real bytes without a `javac` on `PATH`.

pub mod classfile;
pub mod env;

pub use classfile::{AnnotationSpec, ClassSpec, ClassWriter, ElementSpec, InnerSpec, MemberSpec};
pub use env::{env_lock, EnvVarGuard};

#[cfg(feature = "fixture-fs")]
mod fixture_fs;

#[cfg(feature = "fixture-fs")]
pub use fixture_fs::*;
