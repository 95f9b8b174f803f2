//! Disposición de variables en el stack frame.

use std::{collections::HashMap, fmt};

use crate::{ast::Type, lex::Identifier};

/// Toda variable ocupa un slot de 64 bits, sin importar su tipo.
pub const SLOT_SIZE: u32 = 8;

/// Frontera de alineamiento del stack en el punto de llamada.
const STACK_ALIGNMENT: u32 = 16;

/// Slot de una variable, relativo a `%rbp`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    offset: i32,
    typ: Type,
}

impl Slot {
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Tipo con el que fue declarada la variable.
    pub fn typ(&self) -> Type {
        self.typ
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.offset < 0 { "-" } else { "" };
        write!(formatter, "{}0x{:x}(%rbp)", sign, self.offset.unsigned_abs())
    }
}

/// Mapa de variables a slots.
///
/// Los slots se asignan de forma monótona alejándose de `%rbp` y
/// nunca se reutilizan.
#[derive(Default)]
pub struct Frame {
    slots: HashMap<Identifier, Slot>,
    cursor: u32,
}

impl Frame {
    pub fn get(&self, name: &Identifier) -> Option<Slot> {
        self.slots.get(name).copied()
    }

    /// Obtiene el slot de una variable, asignándole uno nuevo si no lo tiene.
    ///
    /// El segundo valor de retorno indica si el slot es nuevo.
    pub fn allocate(&mut self, name: &Identifier, typ: Type) -> (Slot, bool) {
        if let Some(slot) = self.get(name) {
            return (slot, false);
        }

        self.cursor += SLOT_SIZE;
        let slot = Slot {
            offset: -(self.cursor as i32),
            typ,
        };

        self.slots.insert(name.clone(), slot);
        (slot, true)
    }

    /// Bytes ocupados por slots asignados hasta el momento.
    pub fn size(&self) -> u32 {
        self.cursor
    }
}

/// Bytes a reservar en el prólogo para `slots` variables más un bloque
/// de espacio de trabajo, manteniendo alineamiento.
pub fn reservation(slots: usize, scratch: u32) -> u32 {
    let locals = slots as u32 * SLOT_SIZE;
    let aligned = (locals + STACK_ALIGNMENT - 1) / STACK_ALIGNMENT * STACK_ALIGNMENT;

    aligned + scratch
}
