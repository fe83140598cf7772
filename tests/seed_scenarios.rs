//! Each test here transliterates one of the endpoint-inference engine's
//! worked scenarios into a hand-built package graph and checks the result
//! of the public [`oas_infer::find_endpoints`] entry point.

use std::rc::Rc;

use oas_infer::ast::{
    ConstValue, DeclId, ExprId, ExprKind, FieldDecl, File, FuncDecl, GoType, Package,
    PackageGraph, Param, Primitive, Stmt,
};
use oas_infer::config::{EngineConfig, FrameworkTypeNames};
use oas_infer::endpoint::{ParamLocation, Schema};
use oas_infer::find_endpoints;
use pretty_assertions::assert_eq;

fn engine_ty(names: &FrameworkTypeNames) -> Rc<GoType> {
    Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: names.engine.clone(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })))
}

fn context_ty(names: &FrameworkTypeNames) -> Rc<GoType> {
    Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: names.context.trim_start_matches('*').to_string(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })))
}

fn str_const(graph: &mut PackageGraph, value: &str) -> ExprId {
    let id = graph.exprs.alloc(ExprKind::StringLit(value.into()));
    graph.expr_const.insert(id, ConstValue::Str(value.into()));
    id
}

fn int_const(graph: &mut PackageGraph, value: i64) -> ExprId {
    let id = graph.exprs.alloc(ExprKind::IntLit(value));
    graph.expr_const.insert(id, ConstValue::Int(value));
    id
}

fn ident(graph: &mut PackageGraph, name: &str, decl: Option<DeclId>, ty: Rc<GoType>) -> ExprId {
    let id = graph.exprs.alloc(ExprKind::Ident { name: name.into(), decl });
    graph.expr_types.insert(id, ty);
    id
}

fn call(graph: &mut PackageGraph, recv: ExprId, method: &str, args: Vec<ExprId>) -> ExprId {
    let sel = graph.exprs.alloc(ExprKind::Selector { base: recv, sel: method.into() });
    graph.exprs.alloc(ExprKind::Call { func: sel, args })
}

fn single_package(graph: &mut PackageGraph, main: FuncDecl) {
    graph.packages.push(Package {
        import_path: "myapp".into(),
        name: "main".into(),
        files: vec![File { path: "main.go".into(), funcs: vec![main] }],
    });
}

fn run(graph: &PackageGraph) -> Vec<oas_infer::endpoint::Endpoint> {
    find_endpoints(graph, &EngineConfig::default())
}

#[test]
fn verb_coverage() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));

    let mut stmts = Vec::new();
    for verb in ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"] {
        let path = str_const(&mut graph, "/");
        let handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
        let c = call(&mut graph, router, verb, vec![path, handler]);
        stmts.push(Stmt::Expr(c));
    }
    let method = str_const(&mut graph, "CONNECT");
    let path = str_const(&mut graph, "/");
    let handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let c = call(&mut graph, router, "Handle", vec![method, path, handler]);
    stmts.push(Stmt::Expr(c));

    single_package(&mut graph, FuncDecl { name: "main".into(), exported: false, params: vec![], body: stmts });

    let endpoints = run(&graph);
    assert_eq!(endpoints.len(), 9);
    assert!(endpoints.iter().all(|e| e.path == "/"));
    let methods: Vec<&str> = endpoints.iter().map(|e| e.method.as_str()).collect();
    for verb in ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "CONNECT"] {
        assert!(methods.contains(&verb), "missing {verb}");
    }
}

#[test]
fn nested_groups() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));
    let group_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: names.router_group.clone(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })));

    let a_prefix = str_const(&mut graph, "/a");
    let a_rhs = call(&mut graph, router, "Group", vec![a_prefix]);
    let a_lhs = ident(&mut graph, "a", Some(DeclId(1)), group_ty.clone());
    let a_use = ident(&mut graph, "a", Some(DeclId(1)), group_ty.clone());
    let under_a_path = str_const(&mut graph, "/under-a");
    let under_a_handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let under_a_call = call(&mut graph, a_use, "GET", vec![under_a_path, under_a_handler]);

    let b_prefix = str_const(&mut graph, "/b");
    let b_rhs = call(&mut graph, a_use, "Group", vec![b_prefix]);
    let b_lhs = ident(&mut graph, "b", Some(DeclId(2)), group_ty.clone());
    let b_use = ident(&mut graph, "b", Some(DeclId(2)), group_ty.clone());
    let under_ab_path = str_const(&mut graph, "/under-a-b");
    let under_ab_handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let under_ab_call = call(&mut graph, b_use, "GET", vec![under_ab_path, under_ab_handler]);

    let c_prefix = str_const(&mut graph, "/c");
    let c_rhs = call(&mut graph, b_use, "Group", vec![c_prefix]);
    let c_lhs = ident(&mut graph, "c", Some(DeclId(3)), group_ty.clone());
    let c_use = ident(&mut graph, "c", Some(DeclId(3)), group_ty);
    let under_abc_path = str_const(&mut graph, "/under-a-b-c");
    let under_abc_handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let under_abc_call = call(&mut graph, c_use, "GET", vec![under_abc_path, under_abc_handler]);

    single_package(
        &mut graph,
        FuncDecl {
            name: "main".into(),
            exported: false,
            params: vec![],
            body: vec![
                Stmt::Assign { lhs: vec![a_lhs], rhs: vec![a_rhs], define: true },
                Stmt::Expr(under_a_call),
                Stmt::Assign { lhs: vec![b_lhs], rhs: vec![b_rhs], define: true },
                Stmt::Expr(under_ab_call),
                Stmt::Assign { lhs: vec![c_lhs], rhs: vec![c_rhs], define: true },
                Stmt::Expr(under_abc_call),
            ],
        },
    );

    let endpoints = run(&graph);
    let paths: Vec<&str> = endpoints.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/a/under-a", "/a/b/under-a-b", "/a/b/c/under-a-b-c"]
    );
}

#[test]
fn path_parameters() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));

    let mut stmts = Vec::new();
    for template in ["/users/:id", "/trucks/*id", "/orders/:a/*b"] {
        let path = str_const(&mut graph, template);
        let handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
        let c = call(&mut graph, router, "GET", vec![path, handler]);
        stmts.push(Stmt::Expr(c));
    }
    single_package(&mut graph, FuncDecl { name: "main".into(), exported: false, params: vec![], body: stmts });

    let endpoints = run(&graph);
    assert_eq!(endpoints.len(), 3);
    assert_eq!(endpoints[0].path, "/users/{id}");
    assert!(endpoints[0].params.iter().any(|p| p.name == "id" && p.required && p.location == ParamLocation::Path));
    assert_eq!(endpoints[1].path, "/trucks/{id}");
    assert!(endpoints[1].params.iter().any(|p| p.name == "id" && !p.required));
    assert_eq!(endpoints[2].path, "/orders/{a}/{b}");
    let a = endpoints[2].params.iter().find(|p| p.name == "a").unwrap();
    let b = endpoints[2].params.iter().find(|p| p.name == "b").unwrap();
    assert!(a.required);
    assert!(!b.required);
}

#[test]
fn query_binding() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));
    let ctx = ident(&mut graph, "c", Some(DeclId(1)), context_ty(&names));

    let first_name = str_const(&mut graph, "firstname");
    let guest = str_const(&mut graph, "Guest");
    let default_query = call(&mut graph, ctx, "DefaultQuery", vec![first_name, guest]);
    let last_name = str_const(&mut graph, "lastname");
    let query = call(&mut graph, ctx, "Query", vec![last_name]);

    let handler = graph.exprs.alloc(ExprKind::FuncLit {
        params: vec![Param { decl: DeclId(1), name: "c".into(), ty: context_ty(&names) }],
        body: vec![Stmt::Expr(default_query), Stmt::Expr(query)],
    });
    let path = str_const(&mut graph, "/q");
    let c = call(&mut graph, router, "GET", vec![path, handler]);

    single_package(
        &mut graph,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(c)] },
    );

    let endpoints = run(&graph);
    assert_eq!(endpoints.len(), 1);
    let params = &endpoints[0].params;
    let firstname = params.iter().find(|p| p.name == "firstname").unwrap();
    assert_eq!(firstname.default.as_deref(), Some("Guest"));
    assert_eq!(firstname.schema, Schema::String);
    let lastname = params.iter().find(|p| p.name == "lastname").unwrap();
    assert_eq!(lastname.default, None);
}

#[test]
fn json_body_with_tags() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));
    let ctx = ident(&mut graph, "c", Some(DeclId(1)), context_ty(&names));

    let fields = vec![
        FieldDecl {
            name: "A".into(),
            ty: Rc::new(GoType::Primitive(Primitive::String)),
            exported: true,
            embedded: false,
            tag: Some(r#"json:"a__""#.into()),
        },
        FieldDecl {
            name: "a".into(),
            ty: Rc::new(GoType::Primitive(Primitive::String)),
            exported: false,
            embedded: false,
            tag: None,
        },
        FieldDecl {
            name: "B".into(),
            ty: Rc::new(GoType::Primitive(Primitive::String)),
            exported: true,
            embedded: false,
            tag: Some(r#"json:"-""#.into()),
        },
    ];
    let struct_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: "myapp.S".into(),
        underlying: Rc::new(GoType::Struct(fields)),
    })));
    let operand = ident(&mut graph, "s", Some(DeclId(2)), struct_ty.clone());
    let bind_call = call(&mut graph, ctx, "ShouldBindJSON", vec![operand]);

    let handler = graph.exprs.alloc(ExprKind::FuncLit {
        params: vec![Param { decl: DeclId(1), name: "c".into(), ty: context_ty(&names) }],
        body: vec![Stmt::Expr(bind_call)],
    });
    let path = str_const(&mut graph, "/s");
    let c = call(&mut graph, router, "POST", vec![path, handler]);

    single_package(
        &mut graph,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(c)] },
    );

    let endpoints = run(&graph);
    let body = endpoints[0].request_body.as_ref().unwrap();
    assert_eq!(body.content_type, "application/json");
    let Schema::Ref(_) = &body.schema else {
        panic!("expected a registry ref");
    };
}

#[test]
fn cross_package_follow() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));

    let svc = ident(&mut graph, "svc", Some(DeclId(10)), engine_ty(&names));
    let a_prefix = str_const(&mut graph, "/a");
    let group_call = call(&mut graph, svc, "Group", vec![a_prefix]);
    let group_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: names.router_group.clone(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })));
    let grp_lhs = ident(&mut graph, "grp", Some(DeclId(11)), group_ty.clone());
    let grp_use = ident(&mut graph, "grp", Some(DeclId(11)), group_ty);
    let endpoint_path = str_const(&mut graph, "endpoint");
    let handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let get_call = call(&mut graph, grp_use, "GET", vec![endpoint_path, handler]);

    let up_func = FuncDecl {
        name: "Up".into(),
        exported: true,
        params: vec![Param { decl: DeclId(10), name: "svc".into(), ty: engine_ty(&names) }],
        body: vec![
            Stmt::Assign { lhs: vec![grp_lhs], rhs: vec![group_call], define: true },
            Stmt::Expr(get_call),
        ],
    };
    graph.packages.push(Package {
        import_path: "myapp/pkgA".into(),
        name: "pkgA".into(),
        files: vec![File { path: "a.go".into(), funcs: vec![up_func] }],
    });

    let pkg_ident = graph.exprs.alloc(ExprKind::Ident { name: "pkgA".into(), decl: None });
    let follow_call = call(&mut graph, pkg_ident, "Up", vec![router]);

    single_package(
        &mut graph,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(follow_call)] },
    );

    let endpoints = run(&graph);
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].path, "/a/endpoint");
}

#[test]
fn cyclic_schema() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));
    let ctx = ident(&mut graph, "c", Some(DeclId(1)), context_ty(&names));

    let bar_underlying = Rc::new(GoType::Struct(vec![
        FieldDecl {
            name: "Name".into(),
            ty: Rc::new(GoType::Primitive(Primitive::String)),
            exported: true,
            embedded: false,
            tag: None,
        },
        FieldDecl {
            name: "F".into(),
            ty: Rc::new(GoType::Pointer(Rc::new(GoType::Named {
                name: "myapp.Foo".into(),
                underlying: Rc::new(GoType::Unknown),
            }))),
            exported: true,
            embedded: false,
            tag: None,
        },
    ]));
    let foo_underlying = Rc::new(GoType::Struct(vec![
        FieldDecl {
            name: "Name".into(),
            ty: Rc::new(GoType::Primitive(Primitive::String)),
            exported: true,
            embedded: false,
            tag: None,
        },
        FieldDecl {
            name: "F".into(),
            ty: Rc::new(GoType::Pointer(Rc::new(GoType::Named {
                name: "myapp.Foo".into(),
                underlying: Rc::new(GoType::Unknown),
            }))),
            exported: true,
            embedded: false,
            tag: None,
        },
        FieldDecl {
            name: "B".into(),
            ty: Rc::new(GoType::Pointer(Rc::new(GoType::Named {
                name: "myapp.Bar".into(),
                underlying: bar_underlying,
            }))),
            exported: true,
            embedded: false,
            tag: None,
        },
    ]));
    let foo_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: "myapp.Foo".into(),
        underlying: foo_underlying,
    })));
    let foo_operand = ident(&mut graph, "f", Some(DeclId(2)), foo_ty);
    let status = int_const(&mut graph, 200);
    let json_call = call(&mut graph, ctx, "JSON", vec![status, foo_operand]);

    let handler = graph.exprs.alloc(ExprKind::FuncLit {
        params: vec![Param { decl: DeclId(1), name: "c".into(), ty: context_ty(&names) }],
        body: vec![Stmt::Expr(json_call)],
    });
    let path = str_const(&mut graph, "/foo");
    let c = call(&mut graph, router, "GET", vec![path, handler]);

    single_package(
        &mut graph,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(c)] },
    );

    let endpoints = run(&graph);
    let response = &endpoints[0].responses[0];
    assert_eq!(response.status, 200);
    let Schema::Ref(name) = response.schema.as_ref().unwrap() else {
        panic!("expected a ref");
    };
    assert_eq!(name, "Foo");
}

#[test]
fn response_fan_out() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let router = ident(&mut graph, "router", Some(DeclId(0)), engine_ty(&names));
    let ctx = ident(&mut graph, "c", Some(DeclId(1)), context_ty(&names));

    let s401 = int_const(&mut graph, 401);
    let abort = call(&mut graph, ctx, "AbortWithStatus", vec![s401]);

    let s_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: "myapp.S".into(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })));
    let s_operand = ident(&mut graph, "s", Some(DeclId(2)), s_ty);
    let s200 = int_const(&mut graph, 200);
    let json_call = call(&mut graph, ctx, "JSON", vec![s200, s_operand]);

    let s417 = int_const(&mut graph, 417);
    let empty = str_const(&mut graph, "");
    let string_call = call(&mut graph, ctx, "String", vec![s417, empty]);

    let t_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: "myapp.T".into(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })));
    let t_operand = ident(&mut graph, "t", Some(DeclId(3)), t_ty);
    let s418 = int_const(&mut graph, 418);
    let xml_call = call(&mut graph, ctx, "XML", vec![s418, t_operand]);

    let handler = graph.exprs.alloc(ExprKind::FuncLit {
        params: vec![Param { decl: DeclId(1), name: "c".into(), ty: context_ty(&names) }],
        body: vec![
            Stmt::Expr(abort),
            Stmt::Expr(json_call),
            Stmt::Expr(string_call),
            Stmt::Expr(xml_call),
        ],
    });
    let path = str_const(&mut graph, "/fan");
    let c = call(&mut graph, router, "GET", vec![path, handler]);

    single_package(
        &mut graph,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(c)] },
    );

    let endpoints = run(&graph);
    let responses = &endpoints[0].responses;
    assert_eq!(responses.len(), 4);
    let statuses: Vec<u16> = responses.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![401, 200, 417, 418]);
    assert_eq!(responses[1].content_type.as_deref(), Some("application/json"));
    assert_eq!(responses[3].content_type.as_deref(), Some("text/xml"));
}

#[test]
fn group_composition_law() {
    let names = FrameworkTypeNames::default();

    let mut nested = PackageGraph::default();
    let router = ident(&mut nested, "router", Some(DeclId(0)), engine_ty(&names));
    let group_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Named {
        name: names.router_group.clone(),
        underlying: Rc::new(GoType::Struct(vec![])),
    })));
    let a_prefix = str_const(&mut nested, "/a");
    let a_rhs = call(&mut nested, router, "Group", vec![a_prefix]);
    let a_lhs = ident(&mut nested, "a", Some(DeclId(1)), group_ty.clone());
    let a_use = ident(&mut nested, "a", Some(DeclId(1)), group_ty.clone());
    let b_prefix = str_const(&mut nested, "/b");
    let b_rhs = call(&mut nested, a_use, "Group", vec![b_prefix]);
    let b_lhs = ident(&mut nested, "b", Some(DeclId(2)), group_ty.clone());
    let b_use = ident(&mut nested, "b", Some(DeclId(2)), group_ty);
    let path = str_const(&mut nested, "/c");
    let handler = nested.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let get_call = call(&mut nested, b_use, "GET", vec![path, handler]);
    single_package(
        &mut nested,
        FuncDecl {
            name: "main".into(),
            exported: false,
            params: vec![],
            body: vec![
                Stmt::Assign { lhs: vec![a_lhs], rhs: vec![a_rhs], define: true },
                Stmt::Assign { lhs: vec![b_lhs], rhs: vec![b_rhs], define: true },
                Stmt::Expr(get_call),
            ],
        },
    );

    let mut flat = PackageGraph::default();
    let router = ident(&mut flat, "router", Some(DeclId(0)), engine_ty(&names));
    let path = str_const(&mut flat, "/a/b/c");
    let handler = flat.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let get_call = call(&mut flat, router, "GET", vec![path, handler]);
    single_package(
        &mut flat,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(get_call)] },
    );

    let nested_endpoints = run(&nested);
    let flat_endpoints = run(&flat);
    assert_eq!(nested_endpoints[0].path, flat_endpoints[0].path);
    assert_eq!(nested_endpoints[0].method, flat_endpoints[0].method);
}

#[test]
fn embedding_transparency() {
    let names = FrameworkTypeNames::default();
    let mut graph = PackageGraph::default();
    let service_ty = Rc::new(GoType::Pointer(Rc::new(GoType::Struct(vec![FieldDecl {
        name: "Engine".into(),
        ty: engine_ty(&names),
        exported: true,
        embedded: true,
        tag: None,
    }]))));
    let svc = ident(&mut graph, "svc", Some(DeclId(0)), service_ty);
    let path = str_const(&mut graph, "/x");
    let handler = graph.exprs.alloc(ExprKind::FuncLit { params: vec![], body: vec![] });
    let c = call(&mut graph, svc, "GET", vec![path, handler]);
    single_package(
        &mut graph,
        FuncDecl { name: "main".into(), exported: false, params: vec![], body: vec![Stmt::Expr(c)] },
    );

    let endpoints = run(&graph);
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].path, "/x");
    assert_eq!(endpoints[0].method, "GET");
}
