//! Safe wrappers around FFmpeg FFI calls.
//!
//! Every function in this module is safe to call. All `unsafe` blocks are
//! contained here so the transcode code never touches raw pointers.

use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;

// ── Codec-parameter field accessors ─────────────────────────────────────────

/// Read `sample_rate` from an `AVCodecParameters` struct.
///
/// `ffmpeg-next` does not expose this field through a safe accessor.
pub fn codec_params_sample_rate(params: &ffmpeg::codec::parameters::Parameters) -> u32 {
    // SAFETY: `params.as_ptr()` is valid for the lifetime of `params`.
    // `sample_rate` is a plain i32 field.
    unsafe { (*params.as_ptr()).sample_rate.max(0) as u32 }
}

/// Read `ch_layout.nb_channels` from an `AVCodecParameters` struct.
pub fn codec_params_channels(params: &ffmpeg::codec::parameters::Parameters) -> u16 {
    // SAFETY: same as `codec_params_sample_rate`.
    unsafe { (*params.as_ptr()).ch_layout.nb_channels.max(0) as u16 }
}

/// Read `bit_rate` from an `AVCodecParameters` struct.
pub fn codec_params_bit_rate(params: &ffmpeg::codec::parameters::Parameters) -> u64 {
    unsafe { (*params.as_ptr()).bit_rate.max(0) as u64 }
}

// ── Channel layouts ─────────────────────────────────────────────────────────

/// Channel layout to use for a channel count when the source does not say.
pub fn default_channel_layout(channels: u16) -> ChannelLayout {
    match channels {
        1 => ChannelLayout::MONO,
        _ => ChannelLayout::STEREO,
    }
}

/// Number of channels in a layout mask.
pub fn layout_channels(layout: ChannelLayout) -> usize {
    layout.bits().count_ones() as usize
}

/// The frame's own channel layout, or a default derived from its channel
/// count when the layout is unset.
pub fn frame_channel_layout(frame: &ffmpeg::util::frame::Audio) -> ChannelLayout {
    let layout = frame.channel_layout();
    if layout.bits() == 0 {
        default_channel_layout(frame.channels() as u16)
    } else {
        layout
    }
}

// ── Audio plane access ──────────────────────────────────────────────────────

/// Number of data planes for a sample format: one per channel when planar,
/// a single interleaved plane otherwise.
pub fn plane_count(format: Sample, channels: usize) -> usize {
    if format.is_planar() {
        channels
    } else {
        1
    }
}

/// Bytes one sample occupies inside a single plane.
pub fn plane_sample_bytes(format: Sample, channels: usize) -> usize {
    if format.is_planar() {
        format.bytes()
    } else {
        format.bytes() * channels
    }
}

/// Extract an audio plane slice from an `AVFrame`.
///
/// Works around `ffmpeg-next`'s `Audio::data(index)`, which reads
/// `linesize[index]`. Planar audio frames only populate `linesize[0]`, which
/// is the size of every plane.
pub fn audio_plane_data(frame: &ffmpeg::util::frame::Audio, index: usize) -> &[u8] {
    unsafe {
        let f = frame.as_ptr();
        let channels = (*f).ch_layout.nb_channels.max(0) as usize;

        if index >= plane_count(frame.format(), channels) {
            return &[];
        }

        let ptrs = (*f).extended_data;
        if ptrs.is_null() {
            return &[];
        }

        let plane_ptr = *ptrs.add(index);
        if plane_ptr.is_null() {
            return &[];
        }

        let size = (*f).linesize[0].max(0) as usize;
        std::slice::from_raw_parts(plane_ptr, size)
    }
}

/// Mutable version of `audio_plane_data`.
pub fn audio_plane_data_mut(frame: &mut ffmpeg::util::frame::Audio, index: usize) -> &mut [u8] {
    unsafe {
        let f = frame.as_mut_ptr();
        let channels = (*f).ch_layout.nb_channels.max(0) as usize;

        if index >= plane_count(frame.format(), channels) {
            return &mut [];
        }

        let ptrs = (*f).extended_data;
        if ptrs.is_null() {
            return &mut [];
        }

        let plane_ptr = *ptrs.add(index);
        if plane_ptr.is_null() {
            return &mut [];
        }

        let size = (*f).linesize[0].max(0) as usize;
        std::slice::from_raw_parts_mut(plane_ptr, size)
    }
}
