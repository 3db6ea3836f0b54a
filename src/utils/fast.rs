// src/utils/fast.rs
//! “快表”工具集：`hashbrown + AHash`；小集合用 `SmallVec` 避免堆分配。

pub use ahash::RandomState as AHashBuilder;
pub use smallvec::SmallVec;

/// hashbrown + AHash
pub type FastMap<K, V> = hashbrown::HashMap<K, V, AHashBuilder>;
/// hashbrown + AHash
pub type FastSet<K>    = hashbrown::HashSet<K, AHashBuilder>;

/// 预分配容量的 `FastMap`
#[inline]
pub fn fast_map_with_cap<K, V>(cap: usize) -> FastMap<K, V> {
    FastMap::with_capacity_and_hasher(cap, AHashBuilder::default())
}

/// 新建空 `FastSet`
#[inline]
pub fn fast_set<K>() -> FastSet<K> {
    FastSet::with_hasher(AHashBuilder::default())
}

/// 预分配容量的 `FastSet`
#[inline]
pub fn fast_set_with_cap<K>(cap: usize) -> FastSet<K> {
    FastSet::with_capacity_and_hasher(cap, AHashBuilder::default())
}

/// 最多 4 个元素时不分配堆内存
pub type SmallVec4<T> = SmallVec<[T; 4]>;
