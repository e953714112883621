//! Closed vocabularies used by element fields.
//!
//! Each set serializes as its exact, case-sensitive token. Anything outside
//! the set is rejected at decode time.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fixed set of string tokens backing an enumerated field.
pub trait Token: Copy + Sized + 'static {
    /// Every accepted token, in declaration order.
    const TOKENS: &'static [&'static str];

    fn as_str(self) -> &'static str;

    fn from_token(token: &str) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{token}` is not one of: {}", .allowed.join(", "))]
pub struct UnknownToken {
    pub token: String,
    pub allowed: &'static [&'static str],
}

macro_rules! token_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl Token for $name {
            const TOKENS: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )+
                }
            }

            fn from_token(token: &str) -> Option<Self> {
                match token {
                    $( stringify!($variant) => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_token(s).ok_or_else(|| UnknownToken {
                    token: s.to_owned(),
                    allowed: Self::TOKENS,
                })
            }
        }
    };
}

token_set! {
    /// Poke ("nudge") animations.
    pub enum PokeMethod {
        /// Poke
        ChuoYiChuo,
        /// Heart gesture
        BiXin,
        /// Thumbs up
        DianZan,
        /// Heartbreak
        XinSui,
        /// "666"
        LiuLiuLiu,
        /// Ultimate move
        FangDaZhao,
        BaoBeiQiu,
        Rose,
        ZhaoHuanShu,
        RangNiPi,
        JeiYin,
        ShouLei,
        GouYin,
        ZhuaYiXia,
        SuiPing,
        QiaoMen,
    }
}

token_set! {
    /// Where a shared song comes from.
    pub enum MusicShareKind {
        NeteaseCloudMusic,
        QQMusic,
        MiguMusic,
        KugouMusic,
        KuwoMusic,
    }
}
