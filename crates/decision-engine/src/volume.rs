use signal_core::VolumeStatus;

const VOLUME_SHRINK_RATIO: f64 = 0.7;
const VOLUME_HEAVY_RATIO: f64 = 1.5;

pub fn determine_volume(volume_ratio: f64, pct_chg: f64) -> (VolumeStatus, &'static str) {
    if volume_ratio >= VOLUME_HEAVY_RATIO {
        if pct_chg > 0.0 {
            (VolumeStatus::HeavyVolumeUp, "放量上涨，多头力量强劲")
        } else {
            (VolumeStatus::HeavyVolumeDown, "放量下跌，注意风险")
        }
    } else if volume_ratio <= VOLUME_SHRINK_RATIO {
        if pct_chg > 0.0 {
            (VolumeStatus::ShrinkVolumeUp, "缩量上涨，上攻动能不足")
        } else {
            (VolumeStatus::ShrinkVolumeDown, "缩量回调，洗盘特征明显（好）")
        }
    } else {
        (VolumeStatus::Normal, "量能正常")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_volume_down_on_flat_or_negative_change() {
        let (status, _) = determine_volume(0.6, -0.3);
        assert_eq!(status, VolumeStatus::ShrinkVolumeDown);
    }

    #[test]
    fn heavy_volume_up_on_positive_change() {
        let (status, _) = determine_volume(1.8, 2.0);
        assert_eq!(status, VolumeStatus::HeavyVolumeUp);
    }

    #[test]
    fn mid_ratio_is_normal() {
        let (status, _) = determine_volume(1.0, 0.5);
        assert_eq!(status, VolumeStatus::Normal);
    }
}
