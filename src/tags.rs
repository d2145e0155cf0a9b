//! Well-known tag ids, as numbered by the Exif/TIFF standard.

// Primary IFD (IFD0)
pub(crate) const IMAGE_DESCRIPTION: u16 = 0x010E;
pub(crate) const MAKE: u16 = 0x010F;
pub(crate) const MODEL: u16 = 0x0110;
pub(crate) const SOFTWARE: u16 = 0x0131;
pub(crate) const ARTIST: u16 = 0x013B;
pub(crate) const COPYRIGHT: u16 = 0x8298;

// Sub-IFD pointers
pub(crate) const EXIF_IFD_POINTER: u16 = 0x8769;
pub(crate) const GPS_IFD_POINTER: u16 = 0x8825;

// Exif sub-IFD
pub(crate) const DATE_TIME_ORIGINAL: u16 = 0x9003;
pub(crate) const FLASH: u16 = 0x9209;

// GPS sub-IFD
pub(crate) const GPS_LATITUDE_REF: u16 = 0x0001;
pub(crate) const GPS_LATITUDE: u16 = 0x0002;
pub(crate) const GPS_LONGITUDE_REF: u16 = 0x0003;
pub(crate) const GPS_LONGITUDE: u16 = 0x0004;
pub(crate) const GPS_ALTITUDE_REF: u16 = 0x0005;
pub(crate) const GPS_ALTITUDE: u16 = 0x0006;
