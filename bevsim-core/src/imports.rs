pub use anyhow::{anyhow, bail, ensure, Context};
pub use log;
pub use ndarray::{array, concatenate, s, Array, Array1, Axis};
pub use serde::{Deserialize, Serialize};
pub use std::collections::HashMap;
pub use std::ffi::OsStr;
pub use std::fs::File;
pub use std::path::{Path, PathBuf};

pub use crate::traits::*;
