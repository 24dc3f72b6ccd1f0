use bitforce::{apply_bit_flips, hamming_distance, UnitWidth};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&selector, buf)) = data.split_first() else {
                return;
            };
            if buf.is_empty() {
                return;
            }
            let unit = match selector % 4 {
                0 => UnitWidth::U8,
                1 => UnitWidth::U16,
                2 => UnitWidth::U32,
                _ => UnitWidth::U64,
            };
            let bits = buf.len() * 8;
            let step = (selector as usize >> 2) + 1;
            let positions: Vec<usize> = (0..bits).step_by(step).collect();
            let out = apply_bit_flips(buf, &positions, unit);
            assert_eq!(out.len(), buf.len());
            assert_eq!(hamming_distance(buf, &out), positions.len());
        });
    }
}
