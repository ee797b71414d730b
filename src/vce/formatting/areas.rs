//! Geometry and answer decoding for hot-area and drag-and-drop questions.
//!
//! All buffers here are decrypted fields read as little-endian integers:
//! ```text
//! hot areas:        count, { start_x, start_y, end_x, end_y } * count
//! hot answers:      count, { flag: u8 } * count
//! drag/drop areas:  count, { type: u8, reserved: i32, start_x, start_y, end_x, end_y } * count
//! drag/drop answers: count, { number: i32 } * count
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};

use super::image::{self, ImageCropper};
use crate::vce::types::error::{Result, VceError};
use crate::vce::types::models::{DragDropArea, DragDropKind, DragDropType, HotArea};
use crate::vce::utils;

/// Marks a drag item that has no matching drop area.
const UNMATCHED: i32 = -1;

fn read_rect(reader: &mut &[u8]) -> Result<HotArea> {
    let start_x = reader.read_i32::<LittleEndian>()?;
    let start_y = reader.read_i32::<LittleEndian>()?;
    let end_x = reader.read_i32::<LittleEndian>()?;
    let end_y = reader.read_i32::<LittleEndian>()?;
    Ok(HotArea::from_corners(start_x, start_y, end_x, end_y))
}

/// Decodes the clickable rectangles of a hot-area question.
pub fn decode_hot_areas(field: &[u8]) -> Result<Vec<HotArea>> {
    let mut reader = field;
    let count = utils::read_count(&mut reader, "hot area")?;
    (0..count).map(|_| read_rect(&mut reader)).collect()
}

/// Decodes the correct hot areas into comma-joined 1-based indices.
pub fn decode_hot_area_answers(field: &[u8]) -> Result<String> {
    let mut reader = field;
    let count = utils::read_count(&mut reader, "hot area answer")?;

    let mut numbers = Vec::new();
    for i in 0..count {
        if reader.read_u8()? == 1 {
            numbers.push((i + 1).to_string());
        }
    }
    Ok(numbers.join(","))
}

/// Decoded drag-and-drop layout of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragDropLayout {
    pub areas: Vec<DragDropArea>,
    /// Raw type tag of every area, in wire order.
    pub types: Vec<u8>,
}

/// Decodes drag sources and drop targets.
///
/// Drag sources are cropped out of `base_image` and embedded as `<img>` tags.
pub fn decode_drag_drop_areas(
    field: &[u8],
    base_image: &[u8],
    cropper: &dyn ImageCropper,
) -> Result<DragDropLayout> {
    let mut reader = field;
    let count = utils::read_count(&mut reader, "drag and drop area")?;

    let mut layout = DragDropLayout {
        areas: Vec::new(),
        types: Vec::new(),
    };

    for _ in 0..count {
        let tag = reader.read_u8()?;
        layout.types.push(tag);
        utils::skip(&mut reader, 4)?;
        let area = read_rect(&mut reader)?;

        let kind = match DragDropType::try_from(tag)? {
            DragDropType::Drag => {
                let png = cropper.crop_png(base_image, area.x, area.y, area.width, area.height)?;
                DragDropKind::Drag {
                    image: image::image_tag(&png),
                }
            }
            DragDropType::Drop => DragDropKind::Drop,
        };
        trace!("Drag and drop area: tag={}, {:?}", tag, area);
        layout.areas.push(DragDropArea { area, kind });
    }

    Ok(layout)
}

/// Decodes the drag-to-drop mapping into the answer string.
///
/// Values are filed by the type tag at the current position: drag positions
/// go to the drag list, drop positions to the drop list, and `-1` records the
/// current position as an unmatched drag item. The answer lists, for every
/// drop number in order, the 1-based slot of the equal number in the drag list.
pub fn decode_drag_drop_answers(field: &[u8], types: &[u8]) -> Result<String> {
    let mut reader = field;
    let count = utils::read_count(&mut reader, "drag and drop answer")?;

    let mut drag_numbers: Vec<i64> = Vec::new();
    let mut drop_numbers: Vec<i64> = Vec::new();
    let mut index = 0usize;

    for _ in 0..count {
        let number = reader.read_i32::<LittleEndian>()?;
        let position = index;
        index += 1;

        if number == UNMATCHED {
            drag_numbers.push(position as i64);
            continue;
        }

        let tag = *types.get(position).ok_or_else(|| {
            VceError::InvalidFormat(format!(
                "Drag and drop answer {} has no matching area ({} areas)",
                position,
                types.len()
            ))
        })?;
        match DragDropType::try_from(tag)? {
            DragDropType::Drag => drag_numbers.push(number as i64),
            DragDropType::Drop => drop_numbers.push(number as i64),
        }
    }

    if types.len() > index {
        debug!(
            "{} drag and drop areas have no answer entry, completing drag list",
            types.len() - index
        );
        let mut missing: Vec<i64> = Vec::new();
        for number in &drop_numbers {
            if !drag_numbers.contains(number) && !missing.contains(number) {
                missing.push(*number);
            }
        }
        drag_numbers.extend(missing);
        drag_numbers.sort();
    }

    let mut slots = Vec::new();
    for drop_number in &drop_numbers {
        for (slot, drag_number) in drag_numbers.iter().enumerate() {
            if drag_number == drop_number {
                slots.push((slot + 1).to_string());
            }
        }
    }

    Ok(slots.join(","))
}
