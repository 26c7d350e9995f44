//! Camera capture as a scoped resource.
//!
//! [`CaptureGuard`] opens a [`Camera`] and stops it when dropped, so the
//! device is released on every exit path, errors included.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::CaptureError;

/// JPEG quality used for captured photos.
pub const JPEG_QUALITY: u8 = 90;

/// File name given to captured photos.
pub const PHOTO_FILENAME: &str = "photo.jpg";

/// A video device that can produce still frames.
pub trait Camera: Send {
    /// Acquire the device.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Grab the current frame.
    fn frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Release the device. Must be safe to call more than once.
    fn stop(&mut self);
}

/// An open camera, stopped on drop.
pub struct CaptureGuard<'a, C: Camera + ?Sized> {
    camera: &'a mut C,
}

impl<'a, C: Camera + ?Sized> CaptureGuard<'a, C> {
    /// Start the camera. If starting fails the camera is stopped before
    /// returning.
    pub fn open(camera: &'a mut C) -> Result<Self, CaptureError> {
        if let Err(e) = camera.start() {
            camera.stop();
            return Err(e);
        }
        tracing::debug!("Camera opened");
        Ok(Self { camera })
    }

    /// Grab the current frame and encode it as JPEG.
    pub fn capture_jpeg(&mut self) -> Result<Vec<u8>, CaptureError> {
        let frame = self.camera.frame()?;
        encode_jpeg(&frame)
    }
}

impl<C: Camera + ?Sized> Drop for CaptureGuard<'_, C> {
    fn drop(&mut self) {
        self.camera.stop();
        tracing::debug!("Camera released");
    }
}

/// Encode a frame as JPEG at [`JPEG_QUALITY`].
pub fn encode_jpeg(frame: &RgbImage) -> Result<Vec<u8>, CaptureError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(frame)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestCamera {
        deny: bool,
        running: bool,
        stops: usize,
    }

    impl Camera for TestCamera {
        fn start(&mut self) -> Result<(), CaptureError> {
            if self.deny {
                return Err(CaptureError::MediaAccessDenied("Permission denied".into()));
            }
            self.running = true;
            Ok(())
        }

        fn frame(&mut self) -> Result<RgbImage, CaptureError> {
            Ok(RgbImage::from_pixel(4, 4, image::Rgb([40, 160, 60])))
        }

        fn stop(&mut self) {
            self.running = false;
            self.stops += 1;
        }
    }

    #[test]
    fn guard_releases_camera_on_drop() {
        let mut camera = TestCamera::default();
        {
            let mut guard = CaptureGuard::open(&mut camera).unwrap();
            let jpeg = guard.capture_jpeg().unwrap();
            assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        }
        assert!(!camera.running);
        assert_eq!(camera.stops, 1);
    }

    #[test]
    fn denied_camera_is_still_stopped() {
        let mut camera = TestCamera {
            deny: true,
            ..TestCamera::default()
        };
        assert!(matches!(
            CaptureGuard::open(&mut camera),
            Err(CaptureError::MediaAccessDenied(_))
        ));
        assert_eq!(camera.stops, 1);
    }
}
