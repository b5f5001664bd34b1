use bytemuck::{Pod, Zeroable};
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// Generates a fixed-size float vector with named components.
///
/// The layout is `#[repr(C)]` and `Pod`, so a vector can be viewed as `[f32; N]`
/// and slices of vertices can be cast to float buffers without copying.
macro_rules! float_vector {
    ($name:ident, $len:literal, $($field:ident),+) => {
        #[repr(C)]
        #[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            $(pub $field: f32),+
        }

        impl $name {
            pub const LEN: usize = $len;
            pub const ZERO: $name = $name { $($field: 0.0),+ };

            #[inline(always)]
            pub const fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }

            /// Copies up to `LEN` values; components without a value are zero.
            pub fn from_slice(values: &[f32]) -> Self {
                let mut vec = Self::ZERO;
                for (i, value) in values.iter().take($len).enumerate() {
                    vec[i] = *value;
                }
                vec
            }

            pub fn to_array(self) -> [f32; $len] {
                [$(self.$field),+]
            }

            /// Zeroes every component except the last one, which becomes 1.
            pub fn init_homogeneous(&mut self) {
                *self = Self::ZERO;
                self[$len - 1] = 1.0;
            }

            #[inline(always)]
            pub fn dot(self, other: Self) -> f32 {
                0.0 $(+ self.$field * other.$field)+
            }

            pub fn length(self) -> f32 {
                self.dot(self).sqrt()
            }

            /// Euclidean distance between two points.
            pub fn dist(self, other: Self) -> f32 {
                (self - other).length()
            }

            /// Scales the vector to unit length. A zero vector is left unchanged.
            pub fn normalize(&mut self) {
                let length = self.length();
                if length == 0.0 {
                    return;
                }
                *self *= 1.0 / length;
            }

            /// Same as [`Self::normalize`].
            pub fn unit(&mut self) {
                self.normalize();
            }

            pub fn normalized(mut self) -> Self {
                self.normalize();
                self
            }
        }

        impl From<[f32; $len]> for $name {
            fn from(arr: [f32; $len]) -> Self {
                bytemuck::cast(arr)
            }
        }

        impl From<$name> for [f32; $len] {
            fn from(vec: $name) -> Self {
                vec.to_array()
            }
        }

        impl Index<usize> for $name {
            type Output = f32;
            fn index(&self, index: usize) -> &f32 {
                &bytemuck::cast_ref::<$name, [f32; $len]>(self)[index]
            }
        }

        impl IndexMut<usize> for $name {
            fn index_mut(&mut self, index: usize) -> &mut f32 {
                &mut bytemuck::cast_mut::<$name, [f32; $len]>(self)[index]
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, other: $name) -> $name {
                $name { $($field: self.$field + other.$field),+ }
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, other: $name) -> $name {
                $name { $($field: self.$field - other.$field),+ }
            }
        }

        impl Neg for $name {
            type Output = $name;
            fn neg(self) -> $name {
                $name { $($field: -self.$field),+ }
            }
        }

        impl Mul<f32> for $name {
            type Output = $name;
            fn mul(self, scalar: f32) -> $name {
                $name { $($field: self.$field * scalar),+ }
            }
        }

        // Component-wise
        impl Mul for $name {
            type Output = $name;
            fn mul(self, other: $name) -> $name {
                $name { $($field: self.$field * other.$field),+ }
            }
        }

        impl Div<f32> for $name {
            type Output = $name;
            fn div(self, scalar: f32) -> $name {
                $name { $($field: self.$field / scalar),+ }
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, other: $name) {
                $(self.$field += other.$field;)+
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, other: $name) {
                $(self.$field -= other.$field;)+
            }
        }

        impl SubAssign<f32> for $name {
            fn sub_assign(&mut self, scalar: f32) {
                $(self.$field -= scalar;)+
            }
        }

        impl MulAssign<f32> for $name {
            fn mul_assign(&mut self, scalar: f32) {
                $(self.$field *= scalar;)+
            }
        }

        impl MulAssign for $name {
            fn mul_assign(&mut self, other: $name) {
                $(self.$field *= other.$field;)+
            }
        }

        impl DivAssign<f32> for $name {
            fn div_assign(&mut self, scalar: f32) {
                $(self.$field /= scalar;)+
            }
        }
    };
}

float_vector!(Vec2, 2, x, y);
float_vector!(Vec3, 3, x, y, z);
float_vector!(Vec4, 4, x, y, z, w);

impl Vec3 {
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4 { x: self.x, y: self.y, z: self.z, w }
    }
}

impl Vec4 {
    #[inline(always)]
    pub fn xy(self) -> Vec2 {
        Vec2 { x: self.x, y: self.y }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3 { x: self.x, y: self.y, z: self.z }
    }
}
