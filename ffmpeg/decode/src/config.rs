/*!
    Decoder configuration types.
*/

/**
    Hardware decoding device.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwDevice {
    /// VideoToolbox (macOS).
    VideoToolbox,
    /// VA-API (Linux).
    Vaapi,
    /// Direct3D 11 video acceleration (Windows).
    D3d11va,
}

impl HwDevice {
    /**
        The device this platform usually offers.
    */
    pub const fn platform_default() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(Self::VideoToolbox)
        } else if cfg!(target_os = "linux") {
            Some(Self::Vaapi)
        } else if cfg!(target_os = "windows") {
            Some(Self::D3d11va)
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::VideoToolbox => "videotoolbox",
            Self::Vaapi => "vaapi",
            Self::D3d11va => "d3d11va",
        }
    }
}

/**
    Configuration for video decoding.
*/
#[derive(Clone, Debug, Default)]
pub struct VideoDecoderConfig {
    /// Prefer hardware decoding if available. Falls back to software otherwise.
    pub prefer_hw: bool,
    /// Specific hardware device to use (None = platform default).
    pub hw_device: Option<HwDevice>,
}

impl VideoDecoderConfig {
    /**
        Software decoding only.
    */
    pub fn software() -> Self {
        Self::default()
    }

    /**
        Try the platform's hardware decoder first.
    */
    pub fn with_hw_accel() -> Self {
        Self {
            prefer_hw: true,
            hw_device: None,
        }
    }

    /**
        The hardware device decoding should try, if any.
    */
    pub fn requested_device(&self) -> Option<HwDevice> {
        if !self.prefer_hw {
            return None;
        }
        self.hw_device.or(HwDevice::platform_default())
    }
}
