// src/middle/dedup.rs
//! 稳定去重：按签名文本保留首次出现，不排序。

use std::fmt::Display;

use crate::utils::fast::{fast_set_with_cap, FastSet};

pub fn dedup_signatures<T: Display>(items: Vec<T>) -> Vec<T> {
    let mut seen: FastSet<String> = fast_set_with_cap(items.len());
    items
        .into_iter()
        .filter(|it| seen.insert(it.to_string()))
        .collect()
}
