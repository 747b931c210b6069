//! Device model registry
//!
//! Maps the identity string reported by the controller to a static
//! [`Profile`] carrying the panel geometry, pixel format, upload header and
//! buffer size. The table is consulted once at initialisation.

use crate::format::PixelFormat;

/// Panel models the registry knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// 4.41 inch, 400x300. Tested.
    TcP441,
    /// 7.4 inch, 480x800. Registered but not driven; uses pixel format 4.
    TcP74,
    /// 10.2 inch, 1024x1280. Untested but should work.
    TcP102,
}

impl Model {
    /// Short model name
    pub const fn name(self) -> &'static str {
        match self {
            Model::TcP441 => "TC-P441",
            Model::TcP74 => "TC-P74",
            Model::TcP102 => "TC-P102",
        }
    }

    /// Whether the driver can actually run this panel. TC-P74 needs pixel
    /// format 4, so initialisation fails fast rather than uploading
    /// garbage.
    pub const fn is_supported(self) -> bool {
        !matches!(self, Model::TcP74)
    }
}

/// Resolved per-model parameters, selected once at startup
#[derive(Debug)]
pub struct Profile {
    /// Panel model
    pub model: Model,
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// On-wire pixel format
    pub format: PixelFormat,
    /// Fixed 16-byte header prepended to every image upload
    pub header: [u8; 16],
    /// Packed image buffer size in bytes
    pub buffer_size: usize,
}

const TC_P441: Profile = Profile {
    model: Model::TcP441,
    width: 400,
    height: 300,
    // Format 2 is also supported by this panel but 0 is simpler
    format: PixelFormat::Format0,
    header: [
        0x33, 0x01, 0x90, 0x01, 0x2C, 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    buffer_size: 15000,
};

const TC_P74: Profile = Profile {
    model: Model::TcP74,
    width: 480,
    height: 800,
    format: PixelFormat::Format4,
    header: [
        0x3A, 0x01, 0xE0, 0x03, 0x20, 0x01, 0x04, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    buffer_size: 48000,
};

const TC_P102: Profile = Profile {
    model: Model::TcP102,
    width: 1024,
    height: 1280,
    format: PixelFormat::Format0,
    header: [
        0x3D, 0x04, 0x00, 0x05, 0x00, 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    buffer_size: 163840,
};

/// Look up a profile by the exact device identity string
pub fn identify(device_info: &str) -> Option<&'static Profile> {
    match device_info {
        "MpicoSys TC-P441-230_v1.0" => Some(&TC_P441),
        "MpicoSys TC-P74-230_v1.0" => Some(&TC_P74),
        "MpicoSys TC-P102-220_v1.1" => Some(&TC_P102),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_strings_resolve_to_profiles() {
        let p441 = identify("MpicoSys TC-P441-230_v1.0").unwrap();
        assert_eq!(p441.model, Model::TcP441);
        assert_eq!((p441.width, p441.height), (400, 300));
        assert_eq!(p441.format, PixelFormat::Format0);
        assert_eq!(p441.buffer_size, 15000);
        assert_eq!(&p441.header[..7], &[0x33, 0x01, 0x90, 0x01, 0x2C, 0x01, 0x00]);

        let p102 = identify("MpicoSys TC-P102-220_v1.1").unwrap();
        assert_eq!(p102.model, Model::TcP102);
        assert_eq!((p102.width, p102.height), (1024, 1280));
        assert_eq!(p102.buffer_size, 163840);
    }

    #[test]
    fn registered_but_unsupported_model() {
        let p74 = identify("MpicoSys TC-P74-230_v1.0").unwrap();
        assert_eq!(p74.model, Model::TcP74);
        assert_eq!(p74.format, PixelFormat::Format4);
        assert!(!p74.model.is_supported());
    }

    #[test]
    fn unknown_identity_finds_nothing() {
        assert!(identify("MpicoSys TC-P441-230_v2.0").is_none());
        assert!(identify("").is_none());
    }

    #[test]
    fn buffer_sizes_match_geometry() {
        for profile in [&TC_P441, &TC_P74, &TC_P102] {
            let pixels = usize::from(profile.width) * usize::from(profile.height);
            assert_eq!(profile.buffer_size, pixels / 8);
        }
    }
}
