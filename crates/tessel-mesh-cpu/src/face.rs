/// Face direction; the discriminant is the `dir` index used by material lookups.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum FaceDir {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl FaceDir {
    pub const ALL: [FaceDir; 6] = [
        FaceDir::PosX,
        FaceDir::NegX,
        FaceDir::PosY,
        FaceDir::NegY,
        FaceDir::PosZ,
        FaceDir::NegZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<FaceDir> {
        Self::ALL.get(i).copied()
    }

    /// Face pointing along `+axis` (or `-axis` when `positive` is false).
    #[inline]
    pub fn from_axis(axis: usize, positive: bool) -> FaceDir {
        Self::ALL[axis * 2 + usize::from(!positive)]
    }

    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// +1 or -1.
    #[inline]
    pub fn sign(self) -> i32 {
        if self.index() % 2 == 0 { 1 } else { -1 }
    }

    #[inline]
    pub fn normal(self) -> [f32; 3] {
        let mut n = [0.0; 3];
        n[self.axis()] = self.sign() as f32;
        n
    }
}

/// Axis triple for one plane sweep: `D` is the sweep axis, `U` the in-plane
/// width axis and `V` the in-plane height axis.
pub trait SweepAxis {
    const D: usize;
    const U: usize;
    const V: usize;

    /// Maps sweep coordinates `(i, j, k)` along `(D, U, V)` to `[x, y, z]`.
    #[inline]
    fn xyz(i: i32, j: i32, k: i32) -> [i32; 3] {
        let mut p = [0; 3];
        p[Self::D] = i;
        p[Self::U] = j;
        p[Self::V] = k;
        p
    }
}

pub struct SweepX;
pub struct SweepY;
pub struct SweepZ;

impl SweepAxis for SweepX {
    const D: usize = 0;
    const U: usize = 2;
    const V: usize = 1;
}

impl SweepAxis for SweepY {
    const D: usize = 1;
    const U: usize = 2;
    const V: usize = 0;
}

impl SweepAxis for SweepZ {
    const D: usize = 2;
    const U: usize = 0;
    const V: usize = 1;
}

/// In-plane `(u, v)` axes for sweep axis `d`.
#[inline]
pub fn plane_axes(d: usize) -> (usize, usize) {
    let u = if d == 2 { 0 } else { 2 };
    let v = if d == 1 { 0 } else { 1 };
    (u, v)
}
