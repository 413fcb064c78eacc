//! Per-face ambient occlusion: corner levels, byte packing and triangle split.
//!
//! Corners are named looking at the face with `J` to the right and `K` up:
//!
//! ```text
//!   B  -  C    ^ K
//!   |     |    |
//!   A  -  D    +--> J
//! ```
//!
//! Levels: 0 is reverse AO (exposed convex edge), 1 flat, 2 partial, 3 max.

/// Packed value for a face with every corner at level 1.
pub const FLAT_AO: u8 = 0b01_01_01_01;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AoCorners {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
}

impl AoCorners {
    pub const FLAT: AoCorners = AoCorners {
        a: 1,
        b: 1,
        c: 1,
        d: 1,
    };

    /// `C<<6 | D<<4 | B<<2 | A`.
    #[inline]
    pub fn pack(self) -> u8 {
        (self.c & 3) << 6 | (self.d & 3) << 4 | (self.b & 3) << 2 | (self.a & 3)
    }

    #[inline]
    pub fn unpack(packed: u8) -> AoCorners {
        AoCorners {
            a: packed & 3,
            b: (packed >> 2) & 3,
            d: (packed >> 4) & 3,
            c: (packed >> 6) & 3,
        }
    }
}

/// Corner levels for the face between sweep layers `ineg` (the voxel that owns
/// the face) and `ipos` (the cell the face looks into), at in-plane `(j, k)`.
///
/// `solid(i, j, k)` answers in sweep coordinates and must accept one cell of
/// shell on every side.
pub fn compute(
    solid: impl Fn(i32, i32, i32) -> bool,
    ipos: i32,
    ineg: i32,
    j: i32,
    k: i32,
    skip_reverse: bool,
) -> u8 {
    let mut a = 1u8;
    let mut b = 1u8;
    let mut c = 1u8;
    let mut d = 1u8;

    if solid(ipos, j + 1, k) {
        d += 1;
        c += 1;
    }
    if solid(ipos, j - 1, k) {
        a += 1;
        b += 1;
    }
    if solid(ipos, j, k + 1) {
        b += 1;
        c += 1;
    }
    if solid(ipos, j, k - 1) {
        a += 1;
        d += 1;
    }

    // Looking into a solid non-opaque voxel.
    if solid(ipos, j, k) {
        let corner = |lvl: u8, dj: i32, dk: i32| {
            if lvl == 3 || solid(ipos, j + dj, k + dk) {
                3
            } else {
                2
            }
        };
        return AoCorners {
            a: corner(a, -1, -1),
            b: corner(b, -1, 1),
            c: corner(c, 1, 1),
            d: corner(d, 1, -1),
        }
        .pack();
    }

    if skip_reverse {
        let corner = |lvl: u8, dj: i32, dk: i32| {
            if lvl == 1 && solid(ipos, j + dj, k + dk) {
                2
            } else {
                lvl
            }
        };
        return AoCorners {
            a: corner(a, -1, -1),
            b: corner(b, -1, 1),
            c: corner(c, 1, 1),
            d: corner(d, 1, -1),
        }
        .pack();
    }

    let corner = |lvl: u8, dj: i32, dk: i32| {
        if lvl != 1 {
            lvl
        } else if solid(ipos, j + dj, k + dk) {
            2
        } else if !solid(ineg, j, k + dk) || !solid(ineg, j + dj, k) || !solid(ineg, j + dj, k + dk)
        {
            0
        } else {
            1
        }
    };
    AoCorners {
        a: corner(a, -1, -1),
        b: corner(b, -1, 1),
        c: corner(c, 1, 1),
        d: corner(d, 1, -1),
    }
    .pack()
}

/// True splits the quad along the A-C diagonal, false along B-D.
#[inline]
pub fn decide_tri_dir(ao: AoCorners) -> bool {
    let AoCorners { a, b, c, d } = ao;
    if a == c {
        if d == b { d == 2 } else { true }
    } else if d == b {
        false
    } else {
        a + c > d + b
    }
}
