//! Initial window placement

/// Positions for the viewport and panel so that both sit side by side,
/// centered as a pair on a monitor of size `monitor`
///
/// The panel is aligned to the viewport's top edge. Returns
/// `(viewport_position, panel_position)`.
pub fn place_side_by_side(
    monitor: (u32, u32),
    viewport: (u32, u32),
    panel: (u32, u32),
) -> ((i32, i32), (i32, i32)) {
    let total_width = viewport.0 as i32 + panel.0 as i32;
    let x_viewport = (monitor.0 as i32 - total_width) / 2;
    let x_panel = x_viewport + viewport.0 as i32;
    let y = (monitor.1 as i32 - viewport.1 as i32) / 2;
    ((x_viewport, y), (x_panel, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_centered() {
        let (viewport, panel) = place_side_by_side((1920, 1080), (1000, 700), (400, 700));
        assert_eq!(viewport, (260, 190));
        assert_eq!(panel, (1260, 190));
        // Equal margins left and right
        assert_eq!(viewport.0, 1920 - (panel.0 + 400));
    }

    #[test]
    fn test_small_monitor_gives_negative_offsets() {
        let (viewport, panel) = place_side_by_side((1280, 600), (1000, 700), (400, 700));
        assert_eq!(viewport, (-60, -50));
        assert_eq!(panel.0, 940);
    }
}
