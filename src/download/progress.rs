use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PB_STYLE: &str = "{spinner:.yellow} {bytes:.red}/{total_bytes:.red} [{wide_bar:.green}] {percent}% {eta:.yellow} {bytes_per_sec:.green}";

const TICK: &str = "↖↗↘↙ ";

const PB_CHARS: &str = "#>.";

/// Progress bar on stderr, or a hidden one when `visible` is false. The
/// length is filled in once the object size is known.
pub fn transfer_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    match ProgressStyle::with_template(PB_STYLE) {
        Ok(style) => bar.with_style(style.tick_chars(TICK).progress_chars(PB_CHARS)),
        Err(_) => bar,
    }
}
