//! Avatar cluster renderer for multi-user cells

use super::Avatar;
use super::CellRenderer;
use super::CellView;
use super::EditRequest;
use super::Rgb;
use crate::model::Cell;
use crate::model::CellContent;
use crate::model::Column;
use crate::model::User;

/// Avatars drawn before the rest collapse into `+N`.
pub const MAX_VISIBLE_AVATARS: usize = 3;

/// Fallback avatar backgrounds.
pub const AVATAR_PALETTE: [Rgb; 16] = [
    Rgb::hex(0xf44336),
    Rgb::hex(0xe91e63),
    Rgb::hex(0x9c27b0),
    Rgb::hex(0x673ab7),
    Rgb::hex(0x3f51b5),
    Rgb::hex(0x2196f3),
    Rgb::hex(0x03a9f4),
    Rgb::hex(0x00bcd4),
    Rgb::hex(0x009688),
    Rgb::hex(0x4caf50),
    Rgb::hex(0x8bc34a),
    Rgb::hex(0xcddc39),
    Rgb::hex(0xffc107),
    Rgb::hex(0xff9800),
    Rgb::hex(0xff5722),
    Rgb::hex(0x795548),
];

/// Picks a stable palette color for a name.
///
/// Hashes UTF-16 code units as `hash = unit + ((hash << 5) - hash)`, where
/// the shift operates on the low 32 bits, so the same name maps to the same
/// color as the web client.
pub fn avatar_color(name: &str) -> Rgb {
    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        hash = unit as i64 + (shifted - hash);
    }
    AVATAR_PALETTE[(hash.unsigned_abs() % AVATAR_PALETTE.len() as u64) as usize]
}

/// Builds the avatar for one user.
pub fn avatar_for(user: &User) -> Avatar {
    let tooltip = match &user.email {
        Some(email) => format!("{}\n{}", user.name, email),
        None => user.name.clone(),
    };
    Avatar {
        user_id: user.id.clone(),
        initial: user.initial(),
        image: user.avatar.clone(),
        color: match user.avatar {
            Some(_) => None,
            None => Some(avatar_color(&user.name)),
        },
        tooltip,
    }
}

/// Renders multi-user cells as an avatar cluster plus a caption.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiUserRenderer;

impl CellRenderer for MultiUserRenderer {
    fn render(&self, cell: &Cell, _column: &Column, _edit: &EditRequest) -> CellView {
        let CellContent::MultiUser { value: users } = &cell.content else {
            return CellView::Invalid;
        };
        let Some(first) = users.first() else {
            return CellView::Placeholder("None".to_string());
        };

        let avatars = users
            .iter()
            .take(MAX_VISIBLE_AVATARS)
            .map(avatar_for)
            .collect();
        let overflow = users.len().saturating_sub(MAX_VISIBLE_AVATARS);
        let extra = (users.len() > 1).then(|| users.len() - 1);

        CellView::Avatars {
            avatars,
            overflow,
            caption: first.name.clone(),
            extra,
        }
    }
}
