use crate::Error;
use serde::{Deserialize, Serialize};

/// The microcontroller a board is built around, as authored in a board
/// description.
///
/// The flash layout is given as a page reservation, [`ChipDescription::chip`]
/// turns it into the [`Chip`] record with a computed [`SavedCode`] area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChipDescription {
    /// Part number, e.g. `NRF52832`.
    pub part: String,
    /// Chip family, e.g. `NRF52`.
    pub family: String,
    /// Package, e.g. `QFN48`.
    pub package: String,
    /// RAM size in KB.
    pub ram: u32,
    /// Flash size in KB.
    pub flash: u32,
    /// Core clock in MHz.
    pub speed: u32,
    /// Number of USART peripherals.
    pub usart: u8,
    /// Number of SPI peripherals.
    pub spi: u8,
    /// Number of I2C peripherals.
    pub i2c: u8,
    /// Number of ADC peripherals.
    pub adc: u8,
    /// Number of DAC peripherals.
    pub dac: u8,
    /// How the flash is shared between firmware components.
    pub flash_reservation: FlashReservation,
}

impl ChipDescription {
    /// Builds the chip record, computing the saved code area.
    pub fn chip(&self) -> Result<Chip, Error> {
        let saved_code = self.flash_reservation.saved_code(self.flash)?;

        Ok(Chip {
            part: self.part.clone(),
            family: self.family.clone(),
            package: self.package.clone(),
            ram: self.ram,
            flash: self.flash,
            speed: self.speed,
            usart: self.usart,
            spi: self.spi,
            i2c: self.i2c,
            adc: self.adc,
            dac: self.dac,
            saved_code,
        })
    }
}

/// Flash pages reserved by the components sharing the chip's flash.
///
/// The soft device sits at the bottom of flash, the bootloader at the top.
/// The filesystem lives directly below the bootloader and the saved code
/// area directly below the filesystem.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashReservation {
    /// Size of a flash page in bytes.
    pub page_size: u32,
    /// Pages used by the radio stack.
    #[serde(default)]
    pub softdevice_pages: u32,
    /// Pages used by the bootloader.
    #[serde(default)]
    pub bootloader_pages: u32,
    /// Pages used by the filesystem.
    #[serde(default)]
    pub filesystem_pages: u32,
    /// Pages used to store saved code.
    pub code_pages: u32,
}

impl FlashReservation {
    /// Total number of reserved pages.
    pub fn reserved_pages(&self) -> u64 {
        [
            self.softdevice_pages,
            self.bootloader_pages,
            self.filesystem_pages,
            self.code_pages,
        ]
        .into_iter()
        .map(u64::from)
        .sum()
    }

    /// Computes the saved code area for a chip with `flash_kb` KB of flash.
    pub fn saved_code(&self, flash_kb: u32) -> Result<SavedCode, Error> {
        if self.page_size == 0 || self.page_size % 1024 != 0 {
            return Err(Error::InvalidPageSize(self.page_size));
        }
        let page_size_kb = u64::from(self.page_size / 1024);
        let total_pages = u64::from(flash_kb) / page_size_kb;
        let reserved_kb = self.reserved_pages() * page_size_kb;
        let overflow = Error::FlashOverflow {
            reserved_kb,
            flash_kb,
        };

        if self.reserved_pages() > total_pages {
            return Err(overflow);
        }

        // Everything above the saved code area is bootloader, filesystem and
        // the area itself; all of it is known to fit at this point.
        let code_start_page = total_pages
            - u64::from(self.bootloader_pages)
            - u64::from(self.filesystem_pages)
            - u64::from(self.code_pages);
        let address = u32::try_from(code_start_page * u64::from(self.page_size))
            .map_err(|_| overflow.clone())?;
        let flash_available =
            u32::try_from(u64::from(flash_kb) - reserved_kb).map_err(|_| overflow)?;

        Ok(SavedCode {
            address,
            page_size: self.page_size,
            pages: self.code_pages,
            flash_available,
        })
    }
}

/// Where the firmware stores code saved by the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedCode {
    /// Start address of the area.
    pub address: u32,
    /// Size of a flash page in bytes.
    pub page_size: u32,
    /// Number of pages in the area.
    pub pages: u32,
    /// Flash left for the firmware image, in KB.
    pub flash_available: u32,
}

/// Electrical and memory characteristics of the chip, as handed to the
/// generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chip {
    /// Part number, e.g. `NRF52832`.
    pub part: String,
    /// Chip family, e.g. `NRF52`.
    pub family: String,
    /// Package, e.g. `QFN48`.
    pub package: String,
    /// RAM size in KB.
    pub ram: u32,
    /// Flash size in KB.
    pub flash: u32,
    /// Core clock in MHz.
    pub speed: u32,
    /// Number of USART peripherals.
    pub usart: u8,
    /// Number of SPI peripherals.
    pub spi: u8,
    /// Number of I2C peripherals.
    pub i2c: u8,
    /// Number of ADC peripherals.
    pub adc: u8,
    /// Number of DAC peripherals.
    pub dac: u8,
    /// The saved code area.
    pub saved_code: SavedCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrf52832() -> FlashReservation {
        FlashReservation {
            page_size: 4096,
            softdevice_pages: 31,
            bootloader_pages: 8,
            filesystem_pages: 2,
            code_pages: 10,
        }
    }

    #[test]
    fn saved_code_below_filesystem() {
        let saved_code = nrf52832().saved_code(512).unwrap();
        assert_eq!(saved_code.address, (118 - 10) * 4096);
        assert_eq!(saved_code.page_size, 4096);
        assert_eq!(saved_code.pages, 10);
    }

    #[test]
    fn flash_available_subtracts_every_reservation() {
        let reservation = nrf52832();
        let saved_code = reservation.saved_code(512).unwrap();
        assert_eq!(reservation.reserved_pages(), 51);
        assert_eq!(saved_code.flash_available, 512 - 51 * 4);
        assert_eq!(saved_code.flash_available, 308);
    }

    #[test]
    fn overflow_is_rejected() {
        let reservation = FlashReservation {
            softdevice_pages: 120,
            ..nrf52832()
        };
        assert_eq!(
            reservation.saved_code(512),
            Err(Error::FlashOverflow {
                reserved_kb: 140 * 4,
                flash_kb: 512,
            })
        );
    }

    #[test]
    fn huge_reservations_do_not_wrap() {
        let reservation = FlashReservation {
            softdevice_pages: u32::MAX,
            ..nrf52832()
        };
        assert_eq!(reservation.reserved_pages(), u64::from(u32::MAX) + 20);
        assert_eq!(
            reservation.saved_code(512),
            Err(Error::FlashOverflow {
                reserved_kb: (u64::from(u32::MAX) + 20) * 4,
                flash_kb: 512,
            })
        );

        let reservation = FlashReservation {
            page_size: 1 << 31,
            code_pages: u32::MAX,
            ..nrf52832()
        };
        assert!(matches!(
            reservation.saved_code(u32::MAX),
            Err(Error::FlashOverflow { .. })
        ));
    }

    #[test]
    fn saved_code_address_must_fit_into_32_bits() {
        let reservation = FlashReservation {
            page_size: 1 << 31,
            softdevice_pages: 0,
            bootloader_pages: 0,
            filesystem_pages: 0,
            code_pages: 1,
        };
        assert_eq!(
            reservation.saved_code(u32::MAX),
            Err(Error::FlashOverflow {
                reserved_kb: 2 * 1024 * 1024,
                flash_kb: u32::MAX,
            })
        );
    }

    #[test]
    fn page_size_must_be_whole_kilobytes() {
        let reservation = FlashReservation {
            page_size: 1000,
            ..nrf52832()
        };
        assert_eq!(
            reservation.saved_code(512),
            Err(Error::InvalidPageSize(1000))
        );
    }
}
