//! Visitors over the syntax tree

use crate::block::Block;
use crate::expr::{
    AttributeExpr, BinaryExpr, BoolExpr, CallExpr, CompareExpr, Expr, ExprKind, IfExpr,
    UnaryExpr,
};
use crate::module::Module;
use crate::stmt::{
    AssertStmt, AssignStmt, AugAssignStmt, ClosureBlock, ExecStmt, ForStmt, IfStmt, Stmt,
    StmtKind, Target, WhileStmt,
};
use ptpy_visitor_gen::{visit, visit_mut};

visit_mut! {
    pub trait AstVisitorMut {
        pub visit (visitor, module: &mut Module) -> Result<()> {
            visitor.visit_block_mut(&mut module.body)
        }
        pub visit (visitor, block: &mut Block) -> Result<()> {
            for stmt in &mut block.stmts {
                visitor.visit_stmt_mut(stmt)?;
            }
            Ok(())
        }
        pub visit (visitor, stmt: &mut Stmt) -> Result<()> {
            match &mut stmt.kind {
                StmtKind::Expr(expr) => visitor.visit_expr_mut(expr),
                StmtKind::Assign(AssignStmt { target, value }) => {
                    visitor.visit_expr_mut(value)?;
                    visitor.visit_target_mut(target)
                }
                StmtKind::AugAssign(AugAssignStmt { target, value, .. }) => {
                    visitor.visit_expr_mut(value)?;
                    visitor.visit_target_mut(target)
                }
                StmtKind::If(IfStmt { branches, orelse }) => {
                    for (test, block) in branches {
                        visitor.visit_expr_mut(test)?;
                        visitor.visit_block_mut(block)?;
                    }
                    if let Some(orelse) = orelse {
                        visitor.visit_block_mut(orelse)?;
                    }
                    Ok(())
                }
                StmtKind::While(WhileStmt { test, body, orelse }) => {
                    visitor.visit_expr_mut(test)?;
                    visitor.visit_block_mut(body)?;
                    if let Some(orelse) = orelse {
                        visitor.visit_block_mut(orelse)?;
                    }
                    Ok(())
                }
                StmtKind::For(ForStmt { iter, body, orelse, .. }) => {
                    visitor.visit_expr_mut(iter)?;
                    visitor.visit_block_mut(body)?;
                    if let Some(orelse) = orelse {
                        visitor.visit_block_mut(orelse)?;
                    }
                    Ok(())
                }
                StmtKind::Assert(AssertStmt { test, msg }) => {
                    visitor.visit_expr_mut(test)?;
                    if let Some(msg) = msg {
                        visitor.visit_expr_mut(msg)?;
                    }
                    Ok(())
                }
                StmtKind::Exec(ExecStmt { namespace, .. }) => visitor.visit_expr_mut(namespace),
                StmtKind::ClosureBlock(closure_block) => visitor.visit_closure_block_mut(closure_block),
                StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Global(_) => Ok(()),
            }
        }
        pub visit (visitor, closure_block: &mut ClosureBlock) -> Result<()> {
            if let Some(wrapper) = &mut closure_block.wrapper {
                visitor.visit_expr_mut(wrapper)?;
            }
            visitor.visit_block_mut(&mut closure_block.body)
        }
        pub visit (visitor, target: &mut Target) -> Result<()> {
            match target {
                Target::Name(_) => Ok(()),
                Target::Attribute(AttributeExpr { value, .. }) => visitor.visit_expr_mut(value),
            }
        }
        pub visit (visitor, expr: &mut Expr) -> Result<()> {
            match &mut expr.kind {
                ExprKind::Name(_) | ExprKind::Constant(_) => Ok(()),
                ExprKind::Attribute(AttributeExpr { value, .. }) => visitor.visit_expr_mut(value),
                ExprKind::Binary(BinaryExpr { left, right, .. })
                | ExprKind::Bool(BoolExpr { left, right, .. })
                | ExprKind::Compare(CompareExpr { left, right, .. }) => {
                    visitor.visit_expr_mut(left)?;
                    visitor.visit_expr_mut(right)
                }
                ExprKind::Unary(UnaryExpr { operand, .. }) => visitor.visit_expr_mut(operand),
                ExprKind::Call(CallExpr { callee, args }) => {
                    visitor.visit_expr_mut(callee)?;
                    for arg in args {
                        visitor.visit_expr_mut(arg)?;
                    }
                    Ok(())
                }
                ExprKind::IfExp(IfExpr { test, body, orelse }) => {
                    visitor.visit_expr_mut(test)?;
                    visitor.visit_expr_mut(body)?;
                    visitor.visit_expr_mut(orelse)
                }
                ExprKind::List(items) | ExprKind::Tuple(items) => {
                    for item in items {
                        visitor.visit_expr_mut(item)?;
                    }
                    Ok(())
                }
                ExprKind::Dict(items) => {
                    for (key, value) in items {
                        visitor.visit_expr_mut(key)?;
                        visitor.visit_expr_mut(value)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

visit! {
    pub trait AstVisitor {
        pub visit (visitor, module: &Module) -> Result<()> {
            visitor.visit_block(&module.body)
        }
        pub visit (visitor, block: &Block) -> Result<()> {
            for stmt in &block.stmts {
                visitor.visit_stmt(stmt)?;
            }
            Ok(())
        }
        pub visit (visitor, stmt: &Stmt) -> Result<()> {
            match &stmt.kind {
                StmtKind::Expr(expr) => visitor.visit_expr(expr),
                StmtKind::Assign(AssignStmt { target, value })
                | StmtKind::AugAssign(AugAssignStmt { target, value, .. }) => {
                    visitor.visit_expr(value)?;
                    visitor.visit_target(target)
                }
                StmtKind::If(IfStmt { branches, orelse }) => {
                    for (test, block) in branches {
                        visitor.visit_expr(test)?;
                        visitor.visit_block(block)?;
                    }
                    orelse.iter().try_for_each(|orelse| visitor.visit_block(orelse))
                }
                StmtKind::While(WhileStmt { test, body, orelse }) => {
                    visitor.visit_expr(test)?;
                    visitor.visit_block(body)?;
                    orelse.iter().try_for_each(|orelse| visitor.visit_block(orelse))
                }
                StmtKind::For(ForStmt { iter, body, orelse, .. }) => {
                    visitor.visit_expr(iter)?;
                    visitor.visit_block(body)?;
                    orelse.iter().try_for_each(|orelse| visitor.visit_block(orelse))
                }
                StmtKind::Assert(AssertStmt { test, msg }) => {
                    visitor.visit_expr(test)?;
                    msg.iter().try_for_each(|msg| visitor.visit_expr(msg))
                }
                StmtKind::Exec(ExecStmt { namespace, .. }) => visitor.visit_expr(namespace),
                StmtKind::ClosureBlock(closure_block) => visitor.visit_closure_block(closure_block),
                StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Global(_) => Ok(()),
            }
        }
        pub visit (visitor, closure_block: &ClosureBlock) -> Result<()> {
            if let Some(wrapper) = &closure_block.wrapper {
                visitor.visit_expr(wrapper)?;
            }
            visitor.visit_block(&closure_block.body)
        }
        pub visit (visitor, target: &Target) -> Result<()> {
            match target {
                Target::Name(_) => Ok(()),
                Target::Attribute(AttributeExpr { value, .. }) => visitor.visit_expr(value),
            }
        }
        pub visit (visitor, expr: &Expr) -> Result<()> {
            match &expr.kind {
                ExprKind::Name(_) | ExprKind::Constant(_) => Ok(()),
                ExprKind::Attribute(AttributeExpr { value, .. }) => visitor.visit_expr(value),
                ExprKind::Binary(BinaryExpr { left, right, .. })
                | ExprKind::Bool(BoolExpr { left, right, .. })
                | ExprKind::Compare(CompareExpr { left, right, .. }) => {
                    visitor.visit_expr(left)?;
                    visitor.visit_expr(right)
                }
                ExprKind::Unary(UnaryExpr { operand, .. }) => visitor.visit_expr(operand),
                ExprKind::Call(CallExpr { callee, args }) => {
                    visitor.visit_expr(callee)?;
                    args.iter().try_for_each(|arg| visitor.visit_expr(arg))
                }
                ExprKind::IfExp(IfExpr { test, body, orelse }) => {
                    visitor.visit_expr(test)?;
                    visitor.visit_expr(body)?;
                    visitor.visit_expr(orelse)
                }
                ExprKind::List(items) | ExprKind::Tuple(items) => {
                    items.iter().try_for_each(|item| visitor.visit_expr(item))
                }
                ExprKind::Dict(items) => items.iter().try_for_each(|(key, value)| {
                    visitor.visit_expr(key)?;
                    visitor.visit_expr(value)
                }),
            }
        }
    }
}
