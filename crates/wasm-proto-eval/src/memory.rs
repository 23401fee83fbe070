//! Linear memory: a zero-initialised byte buffer with typed little-endian
//! accesses.

use wasm_proto_types::{MemoryType, Value, ValueType};

use crate::error::{Trap, TrapResult};

/// The module's linear memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// A zero-filled memory of `size` bytes.
    pub fn new(size: u32) -> Self {
        Self {
            bytes: vec![0; size as usize],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte range of an access. The address counts in units of the access
    /// width, so the byte offset is `addr * width`.
    fn range(&self, addr: u32, mem_type: MemoryType) -> TrapResult<std::ops::Range<usize>> {
        let width = u64::from(mem_type.size());
        let start = u64::from(addr) * width;
        let end = start + width;
        if end > self.bytes.len() as u64 {
            return Err(Trap::MemoryOutOfBounds {
                addr,
                mem_type,
                len: self.bytes.len(),
            });
        }
        Ok(start as usize..end as usize)
    }

    /// Read a value of `mem_type`, extending narrow integers per its
    /// signedness.
    pub fn load(&self, addr: u32, mem_type: MemoryType) -> TrapResult<Value> {
        let range = self.range(addr, mem_type)?;
        let mut raw = [0u8; 8];
        raw[..range.len()].copy_from_slice(&self.bytes[range]);
        let bits = u64::from_le_bytes(raw);

        let width = mem_type.size() * 8;
        let extended = if mem_type.is_signed() && width < 64 {
            let shift = 64 - width;
            (((bits << shift) as i64) >> shift) as u64
        } else {
            bits
        };

        Ok(match mem_type.value_type() {
            ValueType::Int32 => Value::Int32(extended as u32 as i32),
            ValueType::Int64 => Value::Int64(extended as i64),
            ValueType::Float32 => Value::Float32(f32::from_bits(bits as u32)),
            ValueType::Float64 => Value::Float64(f64::from_bits(bits)),
        })
    }

    /// Write the low `mem_type.size()` bytes of `value`.
    pub fn store(&mut self, addr: u32, mem_type: MemoryType, value: Value) -> TrapResult<()> {
        if value.ty() != mem_type.value_type() {
            return Err(Trap::Malformed(format!(
                "store of {value} through a {mem_type} access"
            )));
        }
        let range = self.range(addr, mem_type)?;
        let raw = value.bits().to_le_bytes();
        let len = range.len();
        self.bytes[range].copy_from_slice(&raw[..len]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_memory_is_zeroed() {
        let mem = Memory::new(16);
        assert_eq!(mem.size(), 16);
        assert!(mem.bytes().iter().all(|&b| b == 0));
        assert_eq!(mem.load(1, MemoryType::Int64S), Ok(Value::Int64(0)));
    }

    #[test]
    fn address_scales_with_access_width() {
        let mut mem = Memory::new(16);
        mem.store(1, MemoryType::Int32S, Value::Int32(0x0403_0201)).unwrap();
        assert_eq!(&mem.bytes()[4..8], &[1, 2, 3, 4]);
        mem.store(3, MemoryType::Int16U, Value::Int32(0x0605)).unwrap();
        assert_eq!(&mem.bytes()[6..8], &[5, 6]);
    }

    #[test]
    fn narrow_loads_extend() {
        let mut mem = Memory::new(8);
        mem.store(0, MemoryType::Int8U, Value::Int32(0xff)).unwrap();
        assert_eq!(mem.load(0, MemoryType::Int8S), Ok(Value::Int32(-1)));
        assert_eq!(mem.load(0, MemoryType::Int8U), Ok(Value::Int32(255)));

        mem.store(0, MemoryType::Int32U, Value::Int32(-2)).unwrap();
        assert_eq!(mem.load(0, MemoryType::Int32S), Ok(Value::Int32(-2)));
        assert_eq!(mem.load(0, MemoryType::Int16S), Ok(Value::Int32(-2)));
        assert_eq!(mem.load(0, MemoryType::Int16U), Ok(Value::Int32(0xfffe)));
    }

    #[test]
    fn stores_truncate() {
        let mut mem = Memory::new(4);
        mem.store(0, MemoryType::Int8S, Value::Int32(0x1234)).unwrap();
        assert_eq!(mem.bytes()[0], 0x34);
        assert_eq!(mem.bytes()[1], 0);
    }

    #[test]
    fn out_of_bounds_access_traps() {
        let mut mem = Memory::new(10);
        assert_eq!(mem.load(4, MemoryType::Int16U), Ok(Value::Int32(0)));
        assert_eq!(
            mem.load(5, MemoryType::Int16U),
            Err(Trap::MemoryOutOfBounds {
                addr: 5,
                mem_type: MemoryType::Int16U,
                len: 10
            })
        );
        assert!(mem.store(u32::MAX, MemoryType::Float64, Value::Float64(1.0)).is_err());
        assert!(mem.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn float_round_trip_preserves_bits() {
        let mut mem = Memory::new(8);
        let nan = f64::from_bits(0x7ff8_0000_0000_0001);
        mem.store(0, MemoryType::Float64, Value::Float64(nan)).unwrap();
        let loaded = mem.load(0, MemoryType::Float64).unwrap();
        assert!(loaded.bit_eq(&Value::Float64(nan)));
    }

    #[test]
    fn store_of_wrong_type_is_malformed() {
        let mut mem = Memory::new(8);
        assert!(matches!(
            mem.store(0, MemoryType::Int64S, Value::Int32(1)),
            Err(Trap::Malformed(_))
        ));
    }
}
