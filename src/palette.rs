use std::collections::HashMap;

/// Index reserved for fully transparent pixels.
pub const TRANSPARENT_INDEX: u8 = 0;
/// Pixels with less alpha than this map to the transparent slot.
pub const ALPHA_CUTOFF: u8 = 128;

/// A fixed color table derived once, from the first frame, and reused for every capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Entry 0 is the transparent slot; the rest are opaque.
    colors: Vec<[u8; 3]>,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    key: u16,
    count: u32,
    sum: [u64; 3],
}

impl Bucket {
    fn mean(&self) -> [u8; 3] {
        let n = u64::from(self.count.max(1));
        [
            ((self.sum[0] + n / 2) / n) as u8,
            ((self.sum[1] + n / 2) / n) as u8,
            ((self.sum[2] + n / 2) / n) as u8,
        ]
    }

    fn channel(&self, channel: usize) -> u8 {
        ((self.key >> (8 - channel * 4)) & 0x0f) as u8
    }
}

impl Palette {
    /// Derives at most `max_colors` entries (the transparent slot included) from straight
    /// RGBA bytes.
    ///
    /// Opaque pixels are first reduced to 4 bits per channel; if more distinct colors remain
    /// than there are slots, the buckets are split by median cut along their widest channel.
    /// The result only depends on the pixel data.
    pub fn derive(rgba: &[u8], max_colors: usize) -> Self {
        let slots = max_colors.clamp(2, 256) - 1;

        let mut histogram: HashMap<u16, Bucket> = HashMap::new();
        for px in rgba.chunks_exact(4) {
            if px[3] < ALPHA_CUTOFF {
                continue;
            }
            let key = (u16::from(px[0] >> 4) << 8) | (u16::from(px[1] >> 4) << 4) | u16::from(px[2] >> 4);
            let bucket = histogram.entry(key).or_insert(Bucket {
                key,
                count: 0,
                sum: [0; 3],
            });
            bucket.count += 1;
            for channel in 0..3 {
                bucket.sum[channel] += u64::from(px[channel]);
            }
        }

        let mut buckets = histogram.into_values().collect::<Vec<_>>();
        buckets.sort_by_key(|bucket| bucket.key);

        let mut colors = vec![[0, 0, 0]];
        if buckets.len() <= slots {
            buckets.sort_by(|a, b| b.count.cmp(&a.count).then(a.key.cmp(&b.key)));
            colors.extend(buckets.iter().map(Bucket::mean));
        } else {
            colors.extend(median_cut(buckets, slots));
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: u8) -> Option<[u8; 3]> {
        self.colors.get(usize::from(index)).copied()
    }

    /// Flat RGB table, as animation containers expect it.
    pub fn rgb_table(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    /// Maps straight RGBA bytes onto this palette without changing it.
    pub fn index_pixels(&self, rgba: &[u8]) -> Vec<u8> {
        let mut cache: HashMap<[u8; 3], u8> = HashMap::new();
        rgba.chunks_exact(4)
            .map(|px| {
                if px[3] < ALPHA_CUTOFF {
                    return TRANSPARENT_INDEX;
                }
                let rgb = [px[0], px[1], px[2]];
                *cache.entry(rgb).or_insert_with(|| self.nearest(rgb))
            })
            .collect()
    }

    fn nearest(&self, rgb: [u8; 3]) -> u8 {
        if self.colors.len() == 1 {
            return TRANSPARENT_INDEX;
        }
        let mut best = (u32::MAX, 1_usize);
        for (index, color) in self.colors.iter().enumerate().skip(1) {
            let distance = color
                .iter()
                .zip(rgb)
                .map(|(a, b)| {
                    let d = i32::from(*a) - i32::from(b);
                    (d * d) as u32
                })
                .sum::<u32>();
            if distance < best.0 {
                best = (distance, index);
            }
        }
        best.1 as u8
    }
}

fn median_cut(buckets: Vec<Bucket>, slots: usize) -> Vec<[u8; 3]> {
    let mut boxes = vec![buckets];
    while boxes.len() < slots {
        // Split the most populated box that still has more than one bucket.
        let Some((index, _)) = boxes
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.len() > 1)
            .max_by_key(|(index, candidate)| {
                let population = candidate.iter().map(|b| u64::from(b.count)).sum::<u64>();
                (population, std::cmp::Reverse(*index))
            })
        else {
            break;
        };

        let mut target = boxes.swap_remove(index);
        let channel = widest_channel(&target);
        target.sort_by_key(|bucket| (bucket.channel(channel), bucket.key));

        let total = target.iter().map(|b| u64::from(b.count)).sum::<u64>();
        let mut running = 0;
        let mut split = 1;
        for (position, bucket) in target.iter().enumerate() {
            running += u64::from(bucket.count);
            if running * 2 >= total {
                split = (position + 1).clamp(1, target.len() - 1);
                break;
            }
        }
        let upper = target.split_off(split);
        boxes.push(target);
        boxes.push(upper);
    }

    let mut colors = boxes
        .iter()
        .map(|members| {
            let merged = members.iter().fold(
                Bucket {
                    key: 0,
                    count: 0,
                    sum: [0; 3],
                },
                |mut acc, bucket| {
                    acc.count += bucket.count;
                    for channel in 0..3 {
                        acc.sum[channel] += bucket.sum[channel];
                    }
                    acc
                },
            );
            (merged.count, merged.mean())
        })
        .collect::<Vec<_>>();
    colors.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    colors.into_iter().map(|(_, color)| color).collect()
}

fn widest_channel(members: &[Bucket]) -> usize {
    (0..3)
        .max_by_key(|&channel| {
            let (low, high) = members.iter().fold((u8::MAX, u8::MIN), |(low, high), bucket| {
                let value = bucket.channel(channel);
                (low.min(value), high.max(value))
            });
            // Prefer red, then green, on ties.
            (high - low, std::cmp::Reverse(channel))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels(colors: &[[u8; 4]]) -> Vec<u8> {
        colors.iter().flatten().copied().collect()
    }

    #[test]
    fn few_colors_are_kept_exactly_with_transparent_slot_first() {
        let rgba = pixels(&[
            [255, 255, 255, 255],
            [0, 0, 0, 255],
            [0, 0, 0, 255],
            [10, 10, 10, 0],
        ]);
        let palette = Palette::derive(&rgba, 16);
        assert_eq!(palette.len(), 3);
        // Most frequent opaque color takes the first opaque slot.
        assert_eq!(palette.color(1), Some([0, 0, 0]));
        assert_eq!(palette.color(2), Some([255, 255, 255]));
        assert_eq!(palette.index_pixels(&rgba), vec![2, 1, 1, TRANSPARENT_INDEX]);
    }

    #[test]
    fn later_colors_snap_to_nearest_entry() {
        let palette = Palette::derive(&pixels(&[[250, 250, 250, 255], [20, 20, 120, 255]]), 16);
        let later = pixels(&[[255, 255, 255, 255], [0, 0, 140, 255], [1, 2, 3, 40]]);
        let indices = palette.index_pixels(&later);
        assert_eq!(palette.color(indices[0]), Some([250, 250, 250]));
        assert_eq!(palette.color(indices[1]), Some([20, 20, 120]));
        assert_eq!(indices[2], TRANSPARENT_INDEX);
    }

    #[test]
    fn gradient_is_reduced_to_the_slot_budget() {
        let rgba = (0..=255_u8)
            .flat_map(|v| [v, 255 - v, v / 2, 255])
            .collect::<Vec<_>>();
        let palette = Palette::derive(&rgba, 16);
        assert_eq!(palette.len(), 16);
        assert_eq!(palette.rgb_table().len(), 48);
        // Every opaque pixel maps to an opaque slot.
        assert!(palette.index_pixels(&rgba).iter().all(|&i| i != TRANSPARENT_INDEX));
    }

    #[test]
    fn derivation_is_deterministic() {
        let rgba = (0..4096_u32)
            .flat_map(|v| [(v * 7) as u8, (v * 13) as u8, (v * 31) as u8, 255])
            .collect::<Vec<_>>();
        assert_eq!(Palette::derive(&rgba, 16), Palette::derive(&rgba, 16));
    }

    #[test]
    fn fully_transparent_input_has_only_the_transparent_slot() {
        let palette = Palette::derive(&[0; 16], 16);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.index_pixels(&[255, 255, 255, 255]), vec![TRANSPARENT_INDEX]);
    }
}
