use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{AnyValue, BasicMetadataValueEnum, FloatValue, FunctionValue};
use inkwell::FloatPredicate;
use log::debug;

use crate::ast::{Expr, Function, Node, Prototype};
use crate::error::{CodegenError, CodegenResult};
use crate::scope::SymbolTable;

/// Result of lowering a [`Node`]: an expression value or a function.
#[derive(Debug, Clone, Copy)]
pub enum Lowered<'ctx> {
    Value(FloatValue<'ctx>),
    Function(FunctionValue<'ctx>),
}

pub struct CodeGen<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,

    named_values: SymbolTable<FloatValue<'ctx>>,
}

impl<'ctx> CodeGen<'ctx> {
    pub fn new(context: &'ctx Context, name: &str) -> Self {
        let module = context.create_module(name);
        let builder = context.create_builder();

        Self {
            context,
            module,
            builder,
            named_values: SymbolTable::new(),
        }
    }

    pub fn lower(&mut self, node: &Node) -> CodegenResult<Lowered<'ctx>> {
        match node {
            Node::Expr(expr) => self.lower_expr(expr).map(Lowered::Value),
            Node::Prototype(proto) => self.lower_prototype(proto).map(Lowered::Function),
            Node::Function(function) => self.lower_function(function).map(Lowered::Function),
        }
    }

    pub fn lower_expr(&self, expr: &Expr) -> CodegenResult<FloatValue<'ctx>> {
        match expr {
            Expr::Number(n) => Ok(self.context.f64_type().const_float(*n)),
            Expr::StringLiteral(_) => Err(CodegenError::UnsupportedStringLiteral),
            Expr::Variable { name, .. } => self
                .named_values
                .lookup(name)
                .ok_or_else(|| CodegenError::UnknownVariable(name.clone())),
            Expr::Binary { op, left, right } => {
                let lhs = self.lower_expr(left)?;
                let rhs = self.lower_expr(right)?;
                self.lower_binary(*op, lhs, rhs)
            }
            Expr::Call { callee, args, .. } => self.lower_call(callee, args),
        }
    }

    fn lower_binary(
        &self,
        op: char,
        lhs: FloatValue<'ctx>,
        rhs: FloatValue<'ctx>,
    ) -> CodegenResult<FloatValue<'ctx>> {
        let value = match op {
            '+' => self.builder.build_float_add(lhs, rhs, "addtmp")?,
            '-' => self.builder.build_float_sub(lhs, rhs, "subtmp")?,
            '*' => self.builder.build_float_mul(lhs, rhs, "multmp")?,
            '<' => {
                let cmp = self
                    .builder
                    .build_float_compare(FloatPredicate::ULT, lhs, rhs, "cmptmp")?;
                // Widen the i1 back to 0.0 or 1.0.
                self.builder
                    .build_unsigned_int_to_float(cmp, self.context.f64_type(), "booltmp")?
            }
            other => return Err(CodegenError::InvalidOperator(other)),
        };

        Ok(value)
    }

    fn lower_call(&self, callee: &str, args: &[Expr]) -> CodegenResult<FloatValue<'ctx>> {
        let function = self
            .module
            .get_function(callee)
            .ok_or_else(|| CodegenError::UnknownFunction(callee.to_string()))?;

        let expected = function.count_params() as usize;
        if expected != args.len() {
            return Err(CodegenError::ArgumentCount {
                name: callee.to_string(),
                expected,
                found: args.len(),
            });
        }

        let args = args
            .iter()
            .map(|arg| self.lower_expr(arg).map(BasicMetadataValueEnum::from))
            .collect::<CodegenResult<Vec<_>>>()?;

        self.builder
            .build_call(function, &args, "calltmp")?
            .try_as_basic_value()
            .left()
            .map(|value| value.into_float_value())
            .ok_or_else(|| CodegenError::VoidCall(callee.to_string()))
    }

    /// Declares `proto` in the module, taking and returning doubles.
    ///
    /// An existing declaration of the same name and arity is reused.
    pub fn lower_prototype(&self, proto: &Prototype) -> CodegenResult<FunctionValue<'ctx>> {
        for (idx, param) in proto.params.iter().enumerate() {
            if proto.params[..idx].contains(param) {
                return Err(CodegenError::DuplicateParameter(param.clone()));
            }
        }

        if let Some(existing) = self.module.get_function(&proto.name) {
            let declared = existing.count_params() as usize;
            if declared != proto.arity() {
                return Err(CodegenError::ConflictingDeclaration {
                    name: proto.name.clone(),
                    declared,
                    found: proto.arity(),
                });
            }
            return Ok(existing);
        }

        let f64_type = self.context.f64_type();
        let param_types: Vec<BasicMetadataTypeEnum> = vec![f64_type.into(); proto.arity()];
        let fn_type = f64_type.fn_type(&param_types, false);
        let function = self.module.add_function(&proto.name, fn_type, None);

        for (param, name) in function.get_param_iter().zip(&proto.params) {
            param.into_float_value().set_name(name);
        }

        Ok(function)
    }

    /// Defines `function` in the module. On failure the module is left as it
    /// was: a function created here is removed again, and an earlier
    /// declaration loses the partial body.
    pub fn lower_function(&mut self, function: &Function) -> CodegenResult<FunctionValue<'ctx>> {
        let name = &function.proto.name;
        debug!("lowering function '{}'", name);

        if self
            .module
            .get_function(name)
            .is_some_and(|existing| existing.count_basic_blocks() > 0)
        {
            return Err(CodegenError::Redefinition(name.clone()));
        }

        let declared_before = self.module.get_function(name).is_some();
        let llvm_fn = self.lower_prototype(&function.proto)?;
        let entry = self.context.append_basic_block(llvm_fn, "entry");
        self.builder.position_at_end(entry);

        let result = self.lower_body(llvm_fn, function);
        self.named_values.clear();
        // Bare expressions lowered later must not land in this function.
        self.builder.clear_insertion_position();

        let Err(err) = result else {
            return Ok(llvm_fn);
        };

        debug!("discarding '{}': {}", name, err);
        if declared_before {
            // Back to the body-less declaration the caller may still hold.
            // SAFETY: the builder no longer points into `entry` and no value
            // built inside it has escaped.
            let _ = unsafe { entry.delete() };
        } else {
            // SAFETY: the function was created above and no handle to it has
            // been returned; the builder no longer points into it.
            unsafe { llvm_fn.delete() };
        }
        Err(err)
    }

    fn lower_body(
        &mut self,
        llvm_fn: FunctionValue<'ctx>,
        function: &Function,
    ) -> CodegenResult<()> {
        // A reused declaration may have been declared with other names.
        self.named_values.clear();
        for (param, name) in llvm_fn.get_param_iter().zip(&function.proto.params) {
            let value = param.into_float_value();
            value.set_name(name);
            self.named_values
                .insert(name.clone(), value)
                .map_err(CodegenError::DuplicateParameter)?;
        }

        let ret = self.lower_expr(&function.body)?;
        self.builder.build_return(Some(&ret))?;

        if !llvm_fn.verify(false) {
            let name = llvm_fn.get_name().to_string_lossy().into_owned();
            return Err(CodegenError::Verification(name));
        }

        Ok(())
    }

    /// Removes a function from the module. Returns whether one was present.
    ///
    /// # Safety
    ///
    /// Every `FunctionValue` or value derived from the named function that the
    /// caller still holds is dangling afterwards and must not be used.
    pub unsafe fn remove_function(&self, name: &str) -> bool {
        match self.module.get_function(name) {
            Some(function) => {
                self.builder.clear_insertion_position();
                // SAFETY: upheld by the caller.
                unsafe { function.delete() };
                true
            }
            None => false,
        }
    }

    pub fn function_ir(&self, name: &str) -> Option<String> {
        self.module
            .get_function(name)
            .map(|function| function.print_to_string().to_string())
    }

    pub fn module_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }
}
