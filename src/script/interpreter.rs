//! The stack machine that evaluates an unlocking script against a locking
//! script (spec §4.7).

use super::chunk::{Chunk, Script};
use super::opcode::Opcode;
use crate::config::InterpreterLimits;
use crate::hash;
use crate::util::scriptnum::ScriptNum;
use crate::{Error, Result, ScriptError};

/// Verifies one signature/pubkey pair for `OP_CHECKSIG*`/`OP_CHECKMULTISIG*`.
///
/// Takes the subscript (the locking or unlocking script from the last
/// `OP_CODESEPARATOR` onward), the signature body with the trailing
/// sighash-type byte already stripped, the raw pubkey bytes, and the
/// sighash-type byte itself. Owns both the BIP-143 preimage assembly and
/// the ECDSA verification so the interpreter never needs to know about
/// transactions or curve arithmetic — it is called only when a real
/// signature check is needed; an empty signature short-circuits to
/// `false` before this hook is ever invoked.
pub type SighashFn<'a> = dyn Fn(&Script, &[u8], &[u8], u8) -> Result<bool> + 'a;

/// A single run of the stack machine. Not reusable across an `eval` call:
/// construct a fresh one per (unlocking, locking) pair.
pub struct Interpreter<'a> {
    limits: InterpreterLimits,
    sighash_fn: Option<&'a SighashFn<'a>>,
    stack: Vec<Vec<u8>>,
    alt_stack: Vec<Vec<u8>>,
    cond_stack: Vec<bool>,
    op_count: u64,
    code_separator: usize,
}

impl<'a> Interpreter<'a> {
    #[must_use]
    pub fn new(limits: InterpreterLimits) -> Self {
        Interpreter {
            limits,
            sighash_fn: None,
            stack: Vec::new(),
            alt_stack: Vec::new(),
            cond_stack: Vec::new(),
            op_count: 0,
            code_separator: 0,
        }
    }

    #[must_use]
    pub fn with_sighash_fn(limits: InterpreterLimits, f: &'a SighashFn<'a>) -> Self {
        Interpreter {
            sighash_fn: Some(f),
            ..Interpreter::new(limits)
        }
    }

    /// Evaluates `unlocking` then `locking` against a shared data stack.
    /// `Ok(())` iff the final stack is non-empty and its top element is
    /// truthy; otherwise the specific [`ScriptError`] is returned.
    pub fn eval(&mut self, unlocking: &Script, locking: &Script) -> Result<()> {
        self.run_script(unlocking)?;
        if !self.cond_stack.is_empty() {
            return Err(ScriptError::UnbalancedConditional.into());
        }
        self.alt_stack.clear();
        self.op_count = 0;
        self.code_separator = 0;

        self.run_script(locking)?;
        if !self.cond_stack.is_empty() {
            return Err(ScriptError::UnbalancedConditional.into());
        }

        match self.stack.last() {
            None => Err(ScriptError::EmptyStack.into()),
            Some(top) if is_truthy(top) => Ok(()),
            Some(_) => Err(ScriptError::EvalFalse.into()),
        }
    }

    fn is_executing(&self) -> bool {
        self.cond_stack.iter().all(|&b| b)
    }

    fn run_script(&mut self, script: &Script) -> Result<()> {
        self.code_separator = 0;
        let mut index = 0usize;
        while index < script.0.len() {
            let chunk = &script.0[index];
            match chunk {
                Chunk::Push(data) => {
                    if self.is_executing() {
                        self.push(data.clone())?;
                    }
                }
                Chunk::Op(op) => self.exec_op(script, *op, index)?,
            }
            index += 1;
        }
        Ok(())
    }

    fn exec_op(&mut self, script: &Script, op: Opcode, index: usize) -> Result<()> {
        use Opcode::*;

        // Flow-control opcodes are processed even in a non-executing
        // branch so conditional-stack balance is preserved.
        match op {
            OP_IF | OP_NOTIF => {
                let mut branch = false;
                if self.is_executing() {
                    let top = self.pop()?;
                    branch = is_truthy(&top);
                    if op == OP_NOTIF {
                        branch = !branch;
                    }
                }
                self.cond_stack.push(branch);
                return Ok(());
            }
            OP_ELSE => {
                let frame = self
                    .cond_stack
                    .last_mut()
                    .ok_or(ScriptError::UnbalancedConditional)?;
                *frame = !*frame;
                return Ok(());
            }
            OP_ENDIF => {
                self.cond_stack
                    .pop()
                    .ok_or(ScriptError::UnbalancedConditional)?;
                return Ok(());
            }
            _ => {}
        }

        if !self.is_executing() {
            return Ok(());
        }

        if op.to_byte() > Opcode::OP_16.to_byte() {
            self.bump_ops()?;
        }

        match op {
            OP_1NEGATE => self.push_scriptnum(ScriptNum(-1))?,
            OP_1 | OP_2 | OP_3 | OP_4 | OP_5 | OP_6 | OP_7 | OP_8 | OP_9 | OP_10 | OP_11
            | OP_12 | OP_13 | OP_14 | OP_15 | OP_16 => {
                self.push_scriptnum(ScriptNum(push_number(op)))?;
            }

            OP_NOP => {}
            OP_VERIFY => {
                let top = self.pop()?;
                if !is_truthy(&top) {
                    return Err(ScriptError::VerifyFailed.into());
                }
            }
            OP_RETURN => return Err(ScriptError::OpReturn.into()),

            OP_TOALTSTACK => {
                let v = self.pop()?;
                self.alt_stack.push(v);
                self.check_stack_size()?;
            }
            OP_FROMALTSTACK => {
                let v = self
                    .alt_stack
                    .pop()
                    .ok_or(ScriptError::AltStackUnderflow)?;
                self.push(v)?;
            }
            OP_2DROP => {
                self.pop()?;
                self.pop()?;
            }
            OP_2DUP => {
                let len = self.stack.len();
                let (a, b) = self.peek2(len)?;
                self.push(a)?;
                self.push(b)?;
            }
            OP_3DUP => {
                let len = self.stack.len();
                if len < 3 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let a = self.stack[len - 3].clone();
                let b = self.stack[len - 2].clone();
                let c = self.stack[len - 1].clone();
                self.push(a)?;
                self.push(b)?;
                self.push(c)?;
            }
            OP_2OVER => {
                let len = self.stack.len();
                if len < 4 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let a = self.stack[len - 4].clone();
                let b = self.stack[len - 3].clone();
                self.push(a)?;
                self.push(b)?;
            }
            OP_2ROT => {
                let len = self.stack.len();
                if len < 6 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let a = self.stack.remove(len - 6);
                let b = self.stack.remove(len - 6);
                self.push(a)?;
                self.push(b)?;
            }
            OP_2SWAP => {
                let len = self.stack.len();
                if len < 4 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                self.stack.swap(len - 4, len - 2);
                self.stack.swap(len - 3, len - 1);
            }
            OP_IFDUP => {
                let top = self.top()?.clone();
                if is_truthy(&top) {
                    self.push(top)?;
                }
            }
            OP_DEPTH => {
                self.push_scriptnum(ScriptNum(self.stack.len() as i64))?;
            }
            OP_DROP => {
                self.pop()?;
            }
            OP_DUP => {
                let top = self.top()?.clone();
                self.push(top)?;
            }
            OP_NIP => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                self.stack.remove(len - 2);
            }
            OP_OVER => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let v = self.stack[len - 2].clone();
                self.push(v)?;
            }
            OP_PICK | OP_ROLL => {
                let n = self.pop_scriptnum()?.0;
                if n < 0 {
                    return Err(ScriptError::InvalidOperandSize.into());
                }
                let len = self.stack.len();
                let n = n as usize;
                if n >= len {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let pos = len - 1 - n;
                let v = if op == OP_PICK {
                    self.stack[pos].clone()
                } else {
                    self.stack.remove(pos)
                };
                self.push(v)?;
            }
            OP_ROT => {
                let len = self.stack.len();
                if len < 3 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let v = self.stack.remove(len - 3);
                self.push(v)?;
            }
            OP_SWAP => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                self.stack.swap(len - 2, len - 1);
            }
            OP_TUCK => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow.into());
                }
                let top = self.stack[len - 1].clone();
                self.stack.insert(len - 2, top);
                self.check_stack_size()?;
            }

            OP_CAT => {
                let b = self.pop()?;
                let mut a = self.pop()?;
                a.extend_from_slice(&b);
                self.push(a)?;
            }
            OP_SPLIT => {
                let n = self.pop_scriptnum()?.0;
                let data = self.pop()?;
                if n < 0 || n as usize > data.len() {
                    return Err(ScriptError::InvalidSplitRange.into());
                }
                let n = n as usize;
                let (left, right) = data.split_at(n);
                self.push(left.to_vec())?;
                self.push(right.to_vec())?;
            }
            OP_NUM2BIN => {
                let size = self.pop_scriptnum()?.0;
                let data = self.pop()?;
                if size < 0 {
                    return Err(ScriptError::InvalidOperandSize.into());
                }
                self.push(num2bin(&data, size as usize)?)?;
            }
            OP_BIN2NUM => {
                let data = self.pop()?;
                let n = ScriptNum::decode(&data, self.limits.max_script_num_len as usize)?;
                self.push_scriptnum(n)?;
            }
            OP_SIZE => {
                let top = self.top()?.clone();
                self.push_scriptnum(ScriptNum(top.len() as i64))?;
            }

            OP_INVERT => {
                let a = self.pop()?;
                self.push(a.iter().map(|b| !b).collect())?;
            }
            OP_AND | OP_OR | OP_XOR => {
                let b = self.pop()?;
                let a = self.pop()?;
                if a.len() != b.len() {
                    return Err(ScriptError::InvalidOperandSize.into());
                }
                let out = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| match op {
                        OP_AND => x & y,
                        OP_OR => x | y,
                        _ => x ^ y,
                    })
                    .collect();
                self.push(out)?;
            }
            OP_EQUAL => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push_bool(a == b)?;
            }
            OP_EQUALVERIFY => {
                let b = self.pop()?;
                let a = self.pop()?;
                if a != b {
                    return Err(ScriptError::EqualVerifyFailed.into());
                }
            }

            OP_1ADD => self.unary_num(|a| a + 1)?,
            OP_1SUB => self.unary_num(|a| a - 1)?,
            OP_NEGATE => self.unary_num(|a| -a)?,
            OP_ABS => self.unary_num(i64::abs)?,
            OP_NOT => self.unary_bool(|a| a == 0)?,
            OP_0NOTEQUAL => self.unary_bool(|a| a != 0)?,
            OP_ADD => self.binary_num(|a, b| Ok(a + b))?,
            OP_SUB => self.binary_num(|a, b| Ok(a - b))?,
            OP_MUL => self.binary_num(|a, b| Ok(a * b))?,
            OP_DIV => self.binary_num(|a, b| {
                if b == 0 {
                    Err(ScriptError::DivideByZero)
                } else {
                    Ok(a / b)
                }
            })?,
            OP_MOD => self.binary_num(|a, b| {
                if b == 0 {
                    Err(ScriptError::DivideByZero)
                } else {
                    Ok(a % b)
                }
            })?,
            OP_LSHIFT => self.shift_num(true)?,
            OP_RSHIFT => self.shift_num(false)?,

            OP_BOOLAND => self.binary_bool(|a, b| a != 0 && b != 0)?,
            OP_BOOLOR => self.binary_bool(|a, b| a != 0 || b != 0)?,
            OP_NUMEQUAL => self.binary_bool(|a, b| a == b)?,
            OP_NUMEQUALVERIFY => {
                let b = self.pop_scriptnum()?.0;
                let a = self.pop_scriptnum()?.0;
                if a != b {
                    return Err(ScriptError::NumEqualVerifyFailed.into());
                }
            }
            OP_NUMNOTEQUAL => self.binary_bool(|a, b| a != b)?,
            OP_LESSTHAN => self.binary_bool(|a, b| a < b)?,
            OP_GREATERTHAN => self.binary_bool(|a, b| a > b)?,
            OP_LESSTHANOREQUAL => self.binary_bool(|a, b| a <= b)?,
            OP_GREATERTHANOREQUAL => self.binary_bool(|a, b| a >= b)?,
            OP_MIN => self.binary_num(|a, b| Ok(a.min(b)))?,
            OP_MAX => self.binary_num(|a, b| Ok(a.max(b)))?,
            OP_WITHIN => {
                let max = self.pop_scriptnum()?.0;
                let min = self.pop_scriptnum()?.0;
                let x = self.pop_scriptnum()?.0;
                self.push_bool(x >= min && x < max)?;
            }

            OP_RIPEMD160 => self.unary_hash(|d| hash::ripemd160(d).to_vec())?,
            OP_SHA1 => self.unary_hash(|d| hash::sha1(d).to_vec())?,
            OP_SHA256 => self.unary_hash(|d| hash::sha256(d).to_vec())?,
            OP_HASH160 => self.unary_hash(|d| hash::hash160(d).to_vec())?,
            OP_HASH256 => self.unary_hash(|d| hash::sha256d(d).to_vec())?,

            OP_CODESEPARATOR => {
                self.code_separator = index + 1;
            }
            OP_CHECKSIG | OP_CHECKSIGVERIFY => {
                let pubkey_bytes = self.pop()?;
                let sig_bytes = self.pop()?;
                let subscript = Script::from_chunks(script.0[self.code_separator..].to_vec());
                let ok = if sig_bytes.is_empty() {
                    false
                } else {
                    self.check_single_sig(&subscript, &sig_bytes, &pubkey_bytes)?
                };
                if op == OP_CHECKSIGVERIFY {
                    if !ok {
                        return Err(ScriptError::CheckSigVerifyFailed.into());
                    }
                } else {
                    self.push_bool(ok)?;
                }
            }
            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
                let ok = self.check_multisig(script)?;
                if op == OP_CHECKMULTISIGVERIFY {
                    if !ok {
                        return Err(ScriptError::CheckMultiSigVerifyFailed.into());
                    }
                } else {
                    self.push_bool(ok)?;
                }
            }

            OP_NOP1 | OP_CHECKLOCKTIMEVERIFY | OP_CHECKSEQUENCEVERIFY | OP_NOP4 | OP_NOP5
            | OP_NOP6 | OP_NOP7 | OP_NOP8 | OP_NOP9 | OP_NOP10 => {}

            OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF => unreachable!("handled above"),

            other => return Err(ScriptError::UnknownOpcode(other.to_byte()).into()),
        }
        Ok(())
    }

    fn check_single_sig(&self, subscript: &Script, sig: &[u8], pubkey: &[u8]) -> Result<bool> {
        let sighash_fn = self.sighash_fn.ok_or(ScriptError::NoSighashFn)?;
        let sighash_type = sig[sig.len() - 1];
        let sig_body = &sig[..sig.len() - 1];
        sighash_fn(subscript, sig_body, pubkey, sighash_type)
    }

    fn check_multisig(&mut self, script: &Script) -> Result<bool> {
        let n = self.pop_scriptnum()?.0;
        if !(0..=20).contains(&n) {
            return Err(ScriptError::InvalidPubKeyCount.into());
        }
        self.op_count += n as u64;
        if self.op_count > self.limits.max_ops {
            return Err(ScriptError::TooManyOps.into());
        }
        let mut pubkeys = Vec::with_capacity(n as usize);
        for _ in 0..n {
            pubkeys.push(self.pop()?);
        }
        pubkeys.reverse();

        let m = self.pop_scriptnum()?.0;
        if m < 0 || m > n {
            return Err(ScriptError::InvalidSigCount.into());
        }
        let mut sigs = Vec::with_capacity(m as usize);
        for _ in 0..m {
            sigs.push(self.pop()?);
        }
        sigs.reverse();

        // historic CHECKMULTISIG off-by-one: one extra element is always
        // popped and its value ignored.
        self.pop()?;

        let subscript = Script::from_chunks(script.0[self.code_separator..].to_vec());
        let mut sig_idx = 0usize;
        for pubkey in &pubkeys {
            if sig_idx >= sigs.len() {
                break;
            }
            let sig = &sigs[sig_idx];
            let matched = if sig.is_empty() {
                false
            } else {
                self.check_single_sig(&subscript, sig, pubkey)?
            };
            if matched {
                sig_idx += 1;
            }
        }
        Ok(sig_idx == sigs.len())
    }

    fn push(&mut self, data: Vec<u8>) -> Result<()> {
        if data.len() as u64 > self.limits.max_element_size {
            return Err(ScriptError::ElementSizeExceeded.into());
        }
        self.stack.push(data);
        self.check_stack_size()
    }

    fn check_stack_size(&self) -> Result<()> {
        if (self.stack.len() + self.alt_stack.len()) as u64 > self.limits.max_stack_size {
            Err(ScriptError::StackSizeExceeded.into())
        } else {
            Ok(())
        }
    }

    fn pop(&mut self) -> Result<Vec<u8>> {
        self.stack.pop().ok_or_else(|| ScriptError::StackUnderflow.into())
    }

    fn top(&self) -> Result<&Vec<u8>> {
        self.stack.last().ok_or_else(|| ScriptError::StackUnderflow.into())
    }

    fn peek2(&self, len: usize) -> Result<(Vec<u8>, Vec<u8>)> {
        if len < 2 {
            return Err(ScriptError::StackUnderflow.into());
        }
        Ok((self.stack[len - 2].clone(), self.stack[len - 1].clone()))
    }

    fn pop_scriptnum(&mut self) -> Result<ScriptNum> {
        let bytes = self.pop()?;
        Ok(ScriptNum::decode(&bytes, self.limits.max_script_num_len as usize)?)
    }

    fn push_scriptnum(&mut self, n: ScriptNum) -> Result<()> {
        self.push(n.encode())
    }

    fn push_bool(&mut self, b: bool) -> Result<()> {
        self.push(if b { vec![1] } else { Vec::new() })
    }

    fn unary_num(&mut self, f: impl Fn(i64) -> i64) -> Result<()> {
        let a = self.pop_scriptnum()?.0;
        self.push_scriptnum(ScriptNum(f(a)))
    }

    fn unary_bool(&mut self, f: impl Fn(i64) -> bool) -> Result<()> {
        let a = self.pop_scriptnum()?.0;
        self.push_bool(f(a))
    }

    fn binary_num(
        &mut self,
        f: impl Fn(i64, i64) -> core::result::Result<i64, ScriptError>,
    ) -> Result<()> {
        let b = self.pop_scriptnum()?.0;
        let a = self.pop_scriptnum()?.0;
        let r = f(a, b).map_err(Error::from)?;
        self.push_scriptnum(ScriptNum(r))
    }

    fn binary_bool(&mut self, f: impl Fn(i64, i64) -> bool) -> Result<()> {
        let b = self.pop_scriptnum()?.0;
        let a = self.pop_scriptnum()?.0;
        self.push_bool(f(a, b))
    }

    fn shift_num(&mut self, left: bool) -> Result<()> {
        let n = self.pop_scriptnum()?.0;
        let a = self.pop_scriptnum()?.0;
        if n < 0 {
            return Err(ScriptError::InvalidShift.into());
        }
        let r = if n >= 64 {
            if left {
                0
            } else if a < 0 {
                -1
            } else {
                0
            }
        } else if left {
            a.wrapping_shl(n as u32)
        } else {
            a >> n
        };
        self.push_scriptnum(ScriptNum(r))
    }

    fn unary_hash(&mut self, f: impl Fn(&[u8]) -> Vec<u8>) -> Result<()> {
        let a = self.pop()?;
        self.push(f(&a))
    }

    fn bump_ops(&mut self) -> Result<()> {
        self.op_count += 1;
        if self.op_count > self.limits.max_ops {
            Err(ScriptError::TooManyOps.into())
        } else {
            Ok(())
        }
    }
}

fn push_number(op: Opcode) -> i64 {
    (op.to_byte() - Opcode::OP_1.to_byte() + 1) as i64
}

/// Pads a minimally-encoded script number to `size` bytes, preserving its
/// sign in the top bit of the last byte (spec §4.7 `OP_NUM2BIN`).
fn num2bin(data: &[u8], size: usize) -> Result<Vec<u8>> {
    if data.len() > size {
        return Err(ScriptError::InvalidOperandSize.into());
    }
    if data.is_empty() {
        return Ok(vec![0u8; size]);
    }
    let mut v = data.to_vec();
    let last = *v.last().expect("checked non-empty above");
    let negative = last & 0x80 != 0;
    if let Some(last) = v.last_mut() {
        *last &= 0x7F;
    }
    v.resize(size, 0);
    if negative {
        *v.last_mut().expect("size > 0 checked by caller") |= 0x80;
    }
    Ok(v)
}

/// Truthiness per spec §4.7: non-empty and not a "signed zero" (all-zero
/// bytes, optionally with `0x80` in the top bit of the last byte).
fn is_truthy(bytes: &[u8]) -> bool {
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != 0 {
            if i == bytes.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::chunk::Chunk;

    fn limits() -> InterpreterLimits {
        InterpreterLimits::PRE_GENESIS
    }

    #[test]
    fn truthiness_rejects_signed_zero() {
        assert!(!is_truthy(&[]));
        assert!(!is_truthy(&[0x00, 0x00]));
        assert!(!is_truthy(&[0x00, 0x80]));
        assert!(is_truthy(&[0x01]));
        assert!(is_truthy(&[0x00, 0x01]));
    }

    #[test]
    fn simple_arithmetic_script_validates() {
        // 2 3 OP_ADD 5 OP_EQUAL
        let unlocking = Script::new();
        let locking = Script::from_chunks(vec![
            Chunk::Push(ScriptNum(2).encode()),
            Chunk::Push(ScriptNum(3).encode()),
            Chunk::Op(Opcode::OP_ADD),
            Chunk::Push(ScriptNum(5).encode()),
            Chunk::Op(Opcode::OP_EQUAL),
        ]);
        let mut interp = Interpreter::new(limits());
        assert!(interp.eval(&unlocking, &locking).is_ok());
    }

    #[test]
    fn op_return_always_fails() {
        let unlocking = Script::new();
        let locking = Script::from_chunks(vec![Chunk::Op(Opcode::OP_RETURN)]);
        let mut interp = Interpreter::new(limits());
        assert!(interp.eval(&unlocking, &locking).is_err());
    }

    #[test]
    fn if_else_endif_selects_branch() {
        // OP_1 OP_IF 2 OP_ELSE 3 OP_ENDIF 2 OP_EQUAL
        let locking = Script::from_chunks(vec![
            Chunk::Op(Opcode::OP_1),
            Chunk::Op(Opcode::OP_IF),
            Chunk::Push(ScriptNum(2).encode()),
            Chunk::Op(Opcode::OP_ELSE),
            Chunk::Push(ScriptNum(3).encode()),
            Chunk::Op(Opcode::OP_ENDIF),
            Chunk::Push(ScriptNum(2).encode()),
            Chunk::Op(Opcode::OP_EQUAL),
        ]);
        let mut interp = Interpreter::new(limits());
        assert!(interp.eval(&Script::new(), &locking).is_ok());
    }

    #[test]
    fn unbalanced_conditional_is_rejected() {
        let locking = Script::from_chunks(vec![
            Chunk::Op(Opcode::OP_1),
            Chunk::Op(Opcode::OP_IF),
        ]);
        let mut interp = Interpreter::new(limits());
        assert!(interp.eval(&Script::new(), &locking).is_err());
    }

    #[test]
    fn checksig_without_hook_fails_with_no_sighash_fn() {
        // stack order for OP_CHECKSIG: sig pushed first, pubkey on top.
        let locking = Script::from_chunks(vec![
            Chunk::Push(vec![0x01; 10]),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(Opcode::OP_CHECKSIG),
        ]);
        let mut interp = Interpreter::new(limits());
        let err = interp.eval(&Script::new(), &locking).unwrap_err();
        assert_eq!(err, Error::ScriptInterpretError(ScriptError::NoSighashFn));
    }

    #[test]
    fn checksig_empty_signature_pushes_false_without_hook() {
        let locking = Script::from_chunks(vec![
            Chunk::Push(Vec::new()),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(Opcode::OP_CHECKSIGVERIFY),
        ]);
        let mut interp = Interpreter::new(limits());
        let err = interp.eval(&Script::new(), &locking).unwrap_err();
        assert_eq!(
            err,
            Error::ScriptInterpretError(ScriptError::CheckSigVerifyFailed)
        );
    }

    #[test]
    fn num2bin_pads_preserving_sign() {
        assert_eq!(num2bin(&[0x01], 4).unwrap(), vec![0x01, 0x00, 0x00, 0x00]);
        assert_eq!(num2bin(&[0x81], 4).unwrap(), vec![0x01, 0x00, 0x00, 0x80]);
        assert_eq!(num2bin(&[], 2).unwrap(), vec![0x00, 0x00]);
    }

    #[test]
    fn stack_manipulation_ops() {
        let locking = Script::from_chunks(vec![
            Chunk::Push(vec![1]),
            Chunk::Push(vec![2]),
            Chunk::Op(Opcode::OP_SWAP),
            Chunk::Push(vec![1]),
            Chunk::Op(Opcode::OP_EQUAL),
        ]);
        let mut interp = Interpreter::new(limits());
        assert!(interp.eval(&Script::new(), &locking).is_ok());
    }

    #[test]
    fn exceeding_max_ops_fails() {
        let mut chunks = vec![Chunk::Op(Opcode::OP_1)];
        for _ in 0..600 {
            chunks.push(Chunk::Op(Opcode::OP_NOP));
        }
        let locking = Script::from_chunks(chunks);
        let mut interp = Interpreter::new(InterpreterLimits::PRE_GENESIS);
        assert_eq!(
            interp.eval(&Script::new(), &locking).unwrap_err(),
            Error::ScriptInterpretError(ScriptError::TooManyOps)
        );
    }
}
