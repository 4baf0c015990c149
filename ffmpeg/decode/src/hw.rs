/*!
    Hardware device contexts and surface download.
*/

use std::ptr;

use ffmpeg_next::{ffi, util::frame::video::Video as VideoFrameFFmpeg};

use crate::config::HwDevice;

/**
    Owned reference to an FFmpeg hardware device context.
*/
pub(crate) struct HwDeviceContext {
    ptr: *mut ffi::AVBufferRef,
    device: HwDevice,
}

impl HwDeviceContext {
    /**
        Create a device context, or `None` if the device is unavailable.
    */
    pub(crate) fn try_create(device: HwDevice) -> Option<Self> {
        let device_type = match device {
            HwDevice::VideoToolbox => ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_VIDEOTOOLBOX,
            HwDevice::Vaapi => ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_VAAPI,
            HwDevice::D3d11va => ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_D3D11VA,
        };

        let mut ctx: *mut ffi::AVBufferRef = ptr::null_mut();
        // SAFETY: ctx is a valid out-pointer; FFmpeg leaves it null on failure
        let ret = unsafe {
            ffi::av_hwdevice_ctx_create(&mut ctx, device_type, ptr::null(), ptr::null_mut(), 0)
        };
        if ret < 0 || ctx.is_null() {
            tracing::warn!(
                device = device.name(),
                error = %ffmpeg_next::Error::from(ret),
                "hardware device unavailable"
            );
            return None;
        }

        Some(Self { ptr: ctx, device })
    }

    pub(crate) fn device(&self) -> HwDevice {
        self.device
    }

    /**
        New reference for handing to a codec context, which takes ownership of it.
    */
    pub(crate) fn create_ref(&self) -> *mut ffi::AVBufferRef {
        // SAFETY: self.ptr is a live buffer reference for as long as self exists
        unsafe { ffi::av_buffer_ref(self.ptr) }
    }
}

impl Drop for HwDeviceContext {
    fn drop(&mut self) {
        // SAFETY: we own exactly one reference
        unsafe { ffi::av_buffer_unref(&mut self.ptr) };
    }
}

/**
    Check if a picture lives in device memory and needs a download.
*/
pub(crate) fn is_hw_frame(frame: &VideoFrameFFmpeg) -> bool {
    // SAFETY: reading a field of a valid AVFrame
    unsafe { !(*frame.as_ptr()).hw_frames_ctx.is_null() }
}

/**
    Download a hardware picture into `dst`, reusing its buffers when the shape matches.
*/
pub(crate) fn transfer_hw_frame(
    hw_frame: &VideoFrameFFmpeg,
    dst: &mut VideoFrameFFmpeg,
) -> Result<(), ffmpeg_next::Error> {
    // SAFETY: both frames are valid AVFrames owned by the decoder
    unsafe {
        if dst.width() != hw_frame.width() || dst.height() != hw_frame.height() {
            ffi::av_frame_unref(dst.as_mut_ptr());
        }

        let ret = ffi::av_hwframe_transfer_data(dst.as_mut_ptr(), hw_frame.as_ptr(), 0);
        if ret < 0 {
            return Err(ffmpeg_next::Error::from(ret));
        }
        (*dst.as_mut_ptr()).pts = (*hw_frame.as_ptr()).pts;
    }
    Ok(())
}
