use toroid_chunk::ChunkCoord;

/// Scheduling class; lower runs first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Chunk = 0,
    Edit = 1,
    Rebuild = 2,
    Light = 3,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Chunk, Bucket::Edit, Bucket::Rebuild, Bucket::Light];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rebuild-class buckets keep only the newest task per coordinate.
    #[inline]
    pub fn dedups(self) -> bool {
        matches!(self, Bucket::Rebuild | Bucket::Light)
    }
}

#[derive(Clone, Debug)]
pub struct Task<P> {
    pub bucket: Bucket,
    pub coord: ChunkCoord,
    pub seq: u64,
    pub payload: P,
}
