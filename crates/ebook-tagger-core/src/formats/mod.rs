// SPDX-License-Identifier: AGPL-3.0-or-later
//! Loaders for each supported manuscript container

pub mod docx;

pub use docx::DocxLoader;
