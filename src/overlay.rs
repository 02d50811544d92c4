use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

use crate::fingers::FingerState;
use crate::landmarks::{LandmarkSet, HAND_CONNECTIONS};

const BONE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const FINGER_UP_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const FINGER_DOWN_COLOR: Rgb<u8> = Rgb([64, 64, 64]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

const JOINT_RADIUS: i64 = 2;
const PIP_SIZE: i64 = 12;
const PIP_GAP: i64 = 4;
const PIP_MARGIN: i64 = 10;
const GLYPH_SIZE: i64 = 8;
const LABEL_SCALE: i64 = 2;
const LABEL_PAD: i64 = 2;

/// Draw the hand skeleton: bones first, joints on top
pub fn draw_hand(image: &mut RgbImage, hand: &LandmarkSet) {
    let (width, height) = image.dimensions();

    for (a, b) in HAND_CONNECTIONS {
        let from = hand.point(a).to_pixel(width, height);
        let to = hand.point(b).to_pixel(width, height);
        draw_line(image, from, to, BONE_COLOR);
    }

    for lm in hand.points() {
        let (cx, cy) = lm.to_pixel(width, height);
        fill_rect(
            image,
            cx - JOINT_RADIUS,
            cy - JOINT_RADIUS,
            JOINT_RADIUS * 2 + 1,
            JOINT_RADIUS * 2 + 1,
            JOINT_COLOR,
        );
    }
}

/// Row of five squares in the top-left corner, lit for extended fingers
pub fn draw_finger_state(image: &mut RgbImage, state: FingerState) {
    for (i, up) in state.as_array().iter().enumerate() {
        let x = PIP_MARGIN + i as i64 * (PIP_SIZE + PIP_GAP);
        let color = if *up { FINGER_UP_COLOR } else { FINGER_DOWN_COLOR };
        fill_rect(image, x, PIP_MARGIN, PIP_SIZE, PIP_SIZE, color);
    }
}

/// Text under the finger pips, drawn with 8x8 bitmap glyphs scaled up.
/// Characters without a glyph leave a blank cell.
pub fn draw_label(image: &mut RgbImage, text: &str) {
    let cell = GLYPH_SIZE * LABEL_SCALE;
    let x0 = PIP_MARGIN;
    let y0 = PIP_MARGIN * 2 + PIP_SIZE;
    let width = text.chars().count() as i64 * cell;

    fill_rect(
        image,
        x0 - LABEL_PAD,
        y0 - LABEL_PAD,
        width + LABEL_PAD * 2,
        cell + LABEL_PAD * 2,
        LABEL_BACKGROUND,
    );

    for (i, c) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(c) else {
            continue;
        };
        let gx = x0 + i as i64 * cell;
        for (row, &bits) in glyph.iter().enumerate() {
            let gy = y0 + row as i64 * LABEL_SCALE;
            // Bit 0 is the leftmost column
            for col in 0..GLYPH_SIZE {
                if (bits >> col) & 1 == 1 {
                    fill_rect(image, gx + col * LABEL_SCALE, gy, LABEL_SCALE, LABEL_SCALE, LABEL_COLOR);
                }
            }
        }
    }
}

fn put_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < image.width() as u64 && (y as u64) < image.height() as u64 {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    for py in y..y + h {
        for px in x..x + w {
            put_pixel_clipped(image, px, py, color);
        }
    }
}

// Bresenham; endpoints must already be near the image (see `Landmark::to_pixel`)
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_clipped(image, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
