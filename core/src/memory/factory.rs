use crate::memory::BufferMemory;
use crate::traits::Memory;

pub fn create_memory() -> Box<dyn Memory> {
    Box::new(BufferMemory::new())
}
