use pretty_assertions::assert_eq;

use crate::ast::{
    AstNode, BinaryExpression, ClassDeclaration, CompilationUnit, Expression, Member,
    NamespaceDeclaration, Statement, TypeDeclaration,
};
use crate::{parse, SyntaxKind};

#[test]
fn typed_casts_smoke() {
    let parse = parse("class Foo {}");
    assert!(parse.errors.is_empty());

    let root = parse.syntax();
    let unit = CompilationUnit::cast(root.clone()).expect("CompilationUnit cast");
    assert!(ClassDeclaration::cast(root).is_none(), "root is not a class");

    let member = unit.members().next().expect("one member");
    assert_eq!(member.kind(), SyntaxKind::ClassDeclaration);
    let class = ClassDeclaration::cast(member.syntax().clone()).expect("class");
    assert_eq!(class.name().unwrap().text(), "Foo");
}

#[test]
fn class_and_method_accessors() {
    let src = "public class Calc { async Task<int> Add(int a, ref int b) { return a + b; } }";
    let parse = parse(src);
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);

    let unit = CompilationUnit::cast(parse.syntax()).unwrap();
    let class = unit
        .members()
        .find_map(|m| ClassDeclaration::cast(m.syntax().clone()))
        .unwrap();
    assert!(class
        .modifiers()
        .is_some_and(|m| m.has(SyntaxKind::PublicKw)));

    let method = class.methods().next().expect("method");
    assert_eq!(method.name().unwrap().text(), "Add");
    assert!(method.is_async());

    let params: Vec<_> = method
        .parameter_list()
        .unwrap()
        .parameters()
        .map(|p| p.name_token().unwrap().text().to_string())
        .collect();
    assert_eq!(params, vec!["a".to_string(), "b".to_string()]);

    let second_type = method
        .parameter_list()
        .unwrap()
        .parameters()
        .nth(1)
        .and_then(|p| p.ty())
        .expect("typed parameter");
    assert_eq!(second_type.kind(), SyntaxKind::PredefinedType);

    let body = method.body().expect("body");
    let statements: Vec<_> = body.statements().map(|s| s.kind()).collect();
    assert_eq!(statements, vec![SyntaxKind::ReturnStatement]);

    let binary = body
        .syntax()
        .descendants()
        .find_map(BinaryExpression::cast)
        .expect("binary expression");
    assert_eq!(binary.op_token().unwrap().text(), "+");
    assert_eq!(binary.lhs().unwrap().syntax().text().to_string().trim(), "a");
    assert_eq!(binary.rhs().unwrap().syntax().text().to_string().trim(), "b");
}

#[test]
fn namespace_and_usings() {
    let src = "global using static System.Math;\nusing IO = System.IO;\nnamespace A.B { struct S { } }\n";
    let parse = parse(src);
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);

    let unit = CompilationUnit::cast(parse.syntax()).unwrap();
    let usings: Vec<_> = unit.usings().collect();
    assert_eq!(usings.len(), 2);
    assert!(usings[0].is_global());
    assert!(usings[0].is_static());
    assert_eq!(usings[0].name().unwrap().text(), "System.Math");
    assert_eq!(usings[1].alias().unwrap().text(), "IO");
    assert_eq!(usings[1].name().unwrap().text(), "System.IO");

    let namespace = unit
        .members()
        .find_map(|m| NamespaceDeclaration::cast(m.syntax().clone()))
        .unwrap();
    assert_eq!(namespace.name().unwrap().text(), "A.B");
    let ty = namespace
        .members()
        .find_map(|m| TypeDeclaration::cast(m.syntax().clone()))
        .unwrap();
    assert_eq!(ty.kind(), SyntaxKind::StructDeclaration);
    assert_eq!(ty.name_token().unwrap().text(), "S");
}

#[test]
fn families_reject_foreign_kinds() {
    assert!(Statement::can_cast(SyntaxKind::IfStatement));
    assert!(!Statement::can_cast(SyntaxKind::ElseClause));
    assert!(Expression::can_cast(SyntaxKind::InvocationExpression));
    assert!(!Expression::can_cast(SyntaxKind::ArgumentList));
    assert!(Member::can_cast(SyntaxKind::GlobalStatement));
    assert!(!Member::can_cast(SyntaxKind::EnumMemberDeclaration));
}
