use bitforce::{count, unrank};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if data.len() < 18 {
                return;
            }
            let n = data[0] as usize;
            let d = data[1] as usize % 9;
            let raw = u128::from_le_bytes(data[2..18].try_into().unwrap());
            let Ok(total) = count(n, d) else {
                return;
            };
            let rank = raw % total;
            let c = unrank(n, d, rank).unwrap();
            assert_eq!(c.distance(), d);
            assert!(c.positions().windows(2).all(|w| w[0] < w[1]));
            assert_eq!(c.rank().unwrap(), rank);
            if let Some(next) = c.successor() {
                assert_eq!(next.rank().unwrap(), rank + 1);
            } else {
                assert_eq!(rank + 1, total);
            }
        });
    }
}
